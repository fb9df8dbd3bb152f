//! 用户与权限模型

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// 用户能力标签, 闭集
///
/// 序列化名沿用认证文件中的点号形式, 例如 `proxy.read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "proxy.read")]
    ProxyRead,
    #[serde(rename = "static.read")]
    StaticRead,
    #[serde(rename = "clipboard.read")]
    ClipboardRead,
    #[serde(rename = "clipboard.write")]
    ClipboardWrite,
    #[serde(rename = "vault.read")]
    VaultRead,
    #[serde(rename = "vault.write")]
    VaultCreate,
    #[serde(rename = "vault.delete")]
    VaultDelete,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ProxyRead => "proxy.read",
            Capability::StaticRead => "static.read",
            Capability::ClipboardRead => "clipboard.read",
            Capability::ClipboardWrite => "clipboard.write",
            Capability::VaultRead => "vault.read",
            Capability::VaultCreate => "vault.write",
            Capability::VaultDelete => "vault.delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 用户记录, 加载后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(rename = "abilities", default)]
    pub capabilities: BTreeSet<Capability>,
    #[serde(rename = "admin", default)]
    pub is_admin: bool,
}

impl UserRecord {
    /// 未配置认证时使用的隐式管理员
    pub fn implicit_admin() -> Self {
        Self {
            username: "__DEFAULT_ADMIN__".to_string(),
            capabilities: BTreeSet::new(),
            is_admin: true,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// 认证文件结构: `{"users": {token: record}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    pub users: HashMap<String, UserRecord>,
}
