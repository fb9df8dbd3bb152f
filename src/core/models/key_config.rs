//! Vault 密码生成配置

use serde::{Deserialize, Serialize};

/// 单个平台的密码生成参数
///
/// `symbols` 为空串表示不使用符号, 缺省表示使用前端默认符号集.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    pub platform: String,
    pub length: u32,
    #[serde(default)]
    pub symbols: Option<String>,
}
