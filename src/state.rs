use std::sync::Arc;

use crate::core::auth::AuthMode;
use crate::core::models::GatewayConfig;
use crate::core::storage::{ConfigStorage, FileKeyConfigStore, KeyConfigStore};
use crate::core::traits::{DefaultStorageConfig, StorageConfig};
use crate::core::Clipboard;
use crate::proxy::SubscriptionService;

/// Web 应用状态
pub struct AppState {
    pub storage: DefaultStorageConfig,
    pub config: GatewayConfig,
    pub auth: Arc<AuthMode>,
    pub clipboard: Clipboard,
    pub vault: Arc<dyn KeyConfigStore>,
    pub subscriptions: SubscriptionService,
}

impl AppState {
    pub fn new(
        storage: DefaultStorageConfig,
        config: GatewayConfig,
        auth: AuthMode,
    ) -> Result<Self, String> {
        let vault = FileKeyConfigStore::new(storage.vault_dir())
            .map_err(|e| format!("创建 Vault 目录失败: {}", e))?;
        let subscriptions = SubscriptionService::new(&config.subscription)
            .map_err(|e| format!("初始化订阅服务失败: {}", e))?;

        Ok(Self {
            storage,
            config,
            auth: Arc::new(auth),
            clipboard: Clipboard::new(),
            vault: Arc::new(vault),
            subscriptions,
        })
    }

    /// 从数据目录加载配置与认证文件
    pub fn load(storage: DefaultStorageConfig, strict_auth: bool) -> Result<Self, String> {
        let config = ConfigStorage::load(&storage)?;
        if !storage.config_path().exists() {
            // 写出默认配置, 方便手动修改
            ConfigStorage::save(&storage, &config)?;
        }
        let auth = AuthMode::load(&storage.auth_path(), strict_auth).map_err(|e| e.to_string())?;
        Self::new(storage, config, auth)
    }
}
