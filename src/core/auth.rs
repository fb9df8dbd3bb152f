//! 认证与授权
//!
//! 认证文件在启动时加载一次, 之后只读. 文件缺失时进入 [`AuthMode::Disabled`],
//! 所有请求都被视为隐式管理员; 文件存在但不合规时默认同样降级 (记录警告),
//! 严格模式下则直接报错.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::core::models::{Capability, UserConfig, UserRecord};

/// 授权失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("需要登录, 或用户不存在")]
    Unauthenticated,

    #[error("当前操作需要权限: {capability}, 用户 {username} 无该权限")]
    Forbidden {
        capability: Capability,
        username: String,
    },
}

/// 认证文件加载失败 (仅严格模式下上抛)
#[derive(Debug, Error)]
pub enum AuthLoadError {
    #[error("读取认证文件失败: {0}")]
    Read(#[from] std::io::Error),

    #[error("认证文件不合规: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// token -> 用户记录
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    users: HashMap<String, UserRecord>,
}

impl CredentialTable {
    pub fn new(users: HashMap<String, UserRecord>) -> Self {
        Self { users }
    }

    pub fn lookup(&self, token: &str) -> Option<&UserRecord> {
        self.users.get(token)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl From<UserConfig> for CredentialTable {
    fn from(config: UserConfig) -> Self {
        Self::new(config.users)
    }
}

/// 认证模式
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// 未配置认证, 任何请求都是管理员
    Disabled,
    /// 按认证表校验
    Enforced(CredentialTable),
}

impl AuthMode {
    /// 从认证文件加载
    ///
    /// `strict` 为 false 时, 不合规的文件会降级为 [`AuthMode::Disabled`].
    pub fn load(path: &Path, strict: bool) -> Result<Self, AuthLoadError> {
        if !path.exists() {
            tracing::warn!("认证文件未配置, 默认允许所有人进行任何操作");
            return Ok(AuthMode::Disabled);
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(AuthLoadError::from)
            .and_then(|content| {
                serde_json::from_str::<UserConfig>(&content).map_err(AuthLoadError::from)
            });

        match parsed {
            Ok(config) => {
                let table = CredentialTable::from(config);
                if table.is_empty() {
                    tracing::warn!("{:?} 中没有任何用户, 所有受保护的路由都将拒绝访问", path);
                } else {
                    tracing::info!("Loaded {} users from {:?}", table.len(), path);
                }
                Ok(AuthMode::Enforced(table))
            }
            Err(e) if !strict => {
                tracing::warn!("{}, 将忽略并允许所有人进行任何操作", e);
                Ok(AuthMode::Disabled)
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_enforced(&self) -> bool {
        matches!(self, AuthMode::Enforced(_))
    }

    /// 解析调用者
    pub fn resolve(&self, token: Option<&str>) -> Result<UserRecord, AuthError> {
        match self {
            AuthMode::Disabled => Ok(UserRecord::implicit_admin()),
            AuthMode::Enforced(table) => token
                .and_then(|t| table.lookup(t))
                .cloned()
                .ok_or(AuthError::Unauthenticated),
        }
    }

    /// 解析调用者并校验所需权限
    ///
    /// 管理员跳过权限检查; 按 `required` 顺序检查, 只报告第一个缺失的权限.
    pub fn authorize(
        &self,
        token: Option<&str>,
        required: &[Capability],
    ) -> Result<UserRecord, AuthError> {
        let user = self.resolve(token)?;
        if user.is_admin {
            return Ok(user);
        }

        if let Some(missing) = required.iter().find(|c| !user.has_capability(**c)) {
            return Err(AuthError::Forbidden {
                capability: *missing,
                username: user.username,
            });
        }

        Ok(user)
    }
}
