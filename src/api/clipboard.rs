use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};
use std::sync::Arc;

use super::common::{bytes_response, TEXT_CONTENT_TYPE};
use crate::core::models::UserRecord;
use crate::state::AppState;

pub async fn read_clipboard(State(state): State<Arc<AppState>>) -> Response {
    bytes_response(TEXT_CONTENT_TYPE, state.clipboard.read().await)
}

pub async fn write_clipboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserRecord>,
    body: Bytes,
) -> StatusCode {
    tracing::debug!("{} wrote {} bytes to clipboard", user.username, body.len());
    state.clipboard.replace(body).await;
    StatusCode::NO_CONTENT
}
