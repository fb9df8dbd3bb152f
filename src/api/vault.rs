use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    Extension,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::models::{KeyConfig, UserRecord};
use crate::core::storage::{KeyConfigStore, VaultError};
use crate::error::GatewayError;
use crate::state::AppState;

/// 在阻塞线程池上执行 Vault 文件操作
async fn with_vault<T, F>(state: &AppState, op: F) -> Result<T, GatewayError>
where
    F: FnOnce(&dyn KeyConfigStore) -> Result<T, VaultError> + Send + 'static,
    T: Send + 'static,
{
    let vault = state.vault.clone();
    tokio::task::spawn_blocking(move || op(vault.as_ref()))
        .await
        .map_err(|e| GatewayError::Storage(format!("Vault 任务失败: {}", e)))?
        .map_err(GatewayError::from)
}

pub async fn list_key_configs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, KeyConfig>>, GatewayError> {
    let configs = with_vault(&state, |vault| vault.list()).await?;
    Ok(Json(configs))
}

pub async fn create_key_config(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<String>,
    Json(config): Json<KeyConfig>,
) -> Result<StatusCode, GatewayError> {
    let platform = config.platform.clone();
    let key = id.clone();
    with_vault(&state, move |vault| vault.put_if_absent(&key, &config)).await?;
    tracing::info!("{} created key config {} ({})", user.username, id, platform);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_key_config(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<String>,
) -> Result<StatusCode, GatewayError> {
    let key = id.clone();
    with_vault(&state, move |vault| vault.delete(&key)).await?;
    tracing::info!("{} deleted key config {}", user.username, id);
    Ok(StatusCode::NO_CONTENT)
}
