//! 前端页面与受保护的静态文件

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::core::traits::StorageConfig;
use crate::error::GatewayError;
use crate::state::AppState;

pub const CLIPBOARD_PAGE: &str = "cloud_clipboard.html";
pub const VAULT_PAGE: &str = "vault.html";

async fn render_template(state: &AppState, name: &str) -> Result<Html<String>, GatewayError> {
    let path = state.storage.templates_dir().join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(Html(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GatewayError::NotFound(name.to_string()))
        }
        Err(e) => Err(GatewayError::Storage(format!("读取页面 {} 失败: {}", name, e))),
    }
}

pub async fn clipboard_page(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, GatewayError> {
    render_template(&state, CLIPBOARD_PAGE).await
}

pub async fn vault_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, GatewayError> {
    render_template(&state, VAULT_PAGE).await
}
