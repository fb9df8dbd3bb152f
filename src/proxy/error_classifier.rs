// 错误分类模块 - 将底层抓取错误归类, 用于日志和错误消息
use reqwest::Error;

/// 归类一次上游抓取失败
///
/// 返回值: (错误类型, 英文说明)
pub fn classify_fetch_error(error: &Error) -> (&'static str, &'static str) {
    if error.is_timeout() {
        ("timeout_error", "upstream did not answer in time")
    } else if error.is_connect() {
        (
            "connection_error",
            "connection failed, check the network or the forward proxy",
        )
    } else if error.is_status() {
        ("status_error", "upstream answered with a non-success status")
    } else if error.is_decode() || error.is_body() {
        ("body_error", "upstream body could not be read")
    } else if error.is_builder() || error.is_request() {
        ("request_error", "request could not be sent")
    } else {
        ("unknown_error", "unknown error occurred")
    }
}
