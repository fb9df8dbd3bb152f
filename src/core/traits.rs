//! 核心 trait 定义
//! 抽象数据目录, 所有持久化文件的位置都从这里解析

use std::path::PathBuf;

/// 存储配置 trait
pub trait StorageConfig: Send + Sync {
    /// 获取数据目录路径
    fn data_dir(&self) -> PathBuf;

    /// 认证文件 (token -> 用户)
    fn auth_path(&self) -> PathBuf {
        self.data_dir().join("auth.json")
    }

    /// 网关配置文件
    fn config_path(&self) -> PathBuf {
        self.data_dir().join("config.json")
    }

    /// 订阅地址文件; 命名订阅使用 `{name}_proxy_url`
    fn subscription_url_path(&self, sub_name: Option<&str>) -> PathBuf {
        match sub_name {
            Some(name) => self.data_dir().join(format!("{}_proxy_url", name)),
            None => self.data_dir().join("proxy_url"),
        }
    }

    /// 自定义节点覆盖文件
    fn custom_nodes_path(&self) -> PathBuf {
        self.data_dir().join("custom_nodes.yaml")
    }

    /// Vault 配置目录
    fn vault_dir(&self) -> PathBuf {
        self.data_dir().join("vault").join("key_configs")
    }

    /// 静态文件目录
    fn static_dir(&self) -> PathBuf {
        self.data_dir().join("static")
    }

    /// 页面模板目录
    fn templates_dir(&self) -> PathBuf {
        self.data_dir().join("templates")
    }
}

/// 默认存储配置 (使用 ~/.site_gateway/)
#[derive(Debug, Clone)]
pub struct DefaultStorageConfig {
    data_dir: PathBuf,
    static_dir: Option<PathBuf>,
    templates_dir: Option<PathBuf>,
}

impl DefaultStorageConfig {
    pub fn new() -> Result<Self, String> {
        let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
        Self::with_path(home.join(".site_gateway"))
    }

    /// 从指定路径创建
    pub fn with_path(data_dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&data_dir).map_err(|e| format!("创建数据目录失败: {}", e))?;

        Ok(Self {
            data_dir,
            static_dir: None,
            templates_dir: None,
        })
    }

    /// 覆盖静态文件目录
    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// 覆盖模板目录
    pub fn with_templates_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.templates_dir = dir;
        self
    }
}

impl StorageConfig for DefaultStorageConfig {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("static"))
    }

    fn templates_dir(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("templates"))
    }
}
