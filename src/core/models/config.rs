//! 网关配置模型

use serde::{Deserialize, Serialize};

/// 网关配置 (`config.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub subscription: SubscriptionConfig,
}

/// 订阅抓取与转换配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// 请求上游时使用的 User-Agent
    pub user_agent: String,

    /// 单次抓取超时(秒), 不重试
    pub fetch_timeout_secs: u64,

    /// 命名订阅使用的前置代理 (socks5://, http://)
    pub forward_proxy: Option<String>,

    /// 用最小规则集替换上游 rules
    pub override_rules: bool,

    /// 在 main 之后追加 mainland 选择组
    pub include_mainland_group: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            user_agent: "clash-verge/v1.3.8".to_string(),
            fetch_timeout_secs: 10,
            forward_proxy: None,
            override_rules: true,
            include_mainland_group: false,
        }
    }
}
