//! 配置存储服务
//! 从数据目录下的 config.json 读取网关配置

use crate::core::models::GatewayConfig;
use crate::core::traits::StorageConfig;

/// 配置存储服务
pub struct ConfigStorage;

impl ConfigStorage {
    /// 加载网关配置, 文件不存在时返回默认值
    pub fn load<S: StorageConfig>(storage: &S) -> Result<GatewayConfig, String> {
        let config_path = storage.config_path();
        if !config_path.exists() {
            tracing::info!("{:?} not found, using default config", config_path);
            return Ok(GatewayConfig::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("读取配置文件失败: {}", e))?;
        let config: GatewayConfig =
            serde_json::from_str(&content).map_err(|e| format!("解析配置文件失败: {}", e))?;

        Ok(config)
    }

    /// 保存网关配置 (原子化写入)
    pub fn save<S: StorageConfig>(storage: &S, config: &GatewayConfig) -> Result<(), String> {
        let config_path = storage.config_path();
        let content =
            serde_json::to_string_pretty(config).map_err(|e| format!("序列化配置失败: {}", e))?;

        let temp_path = config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content).map_err(|e| format!("写入临时文件失败: {}", e))?;
        std::fs::rename(&temp_path, &config_path)
            .map_err(|e| format!("重命名文件失败: {}", e))?;

        Ok(())
    }
}
