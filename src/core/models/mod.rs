//! 核心数据模型

mod config;
mod key_config;
mod user;

pub use config::{GatewayConfig, SubscriptionConfig};
pub use key_config::KeyConfig;
pub use user::{Capability, UserConfig, UserRecord};
