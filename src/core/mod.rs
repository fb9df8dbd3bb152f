//! 核心模块
//! 不依赖 HTTP 层的业务逻辑

pub mod auth;
pub mod clipboard;
pub mod models;
pub mod storage;
pub mod traits;

// 重导出常用类型
pub use auth::{AuthError, AuthMode, CredentialTable};
pub use clipboard::Clipboard;
pub use traits::{DefaultStorageConfig, StorageConfig};
