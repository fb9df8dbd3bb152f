use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

pub const YAML_CONTENT_TYPE: &str = "application/x-yaml";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// 带指定 Content-Type 的字节响应
pub fn bytes_response(content_type: &'static str, body: Bytes) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        body,
    )
        .into_response()
}

pub async fn request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = std::time::Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed();
    // 只记录 path, query 里可能带 auth_token
    tracing::info!(
        "{} {} - status: {}, latency: {}ms",
        method,
        path,
        response.status(),
        duration.as_millis()
    );
    response
}
