mod config;
mod vault;

pub use config::ConfigStorage;
pub use vault::{is_valid_identifier, FileKeyConfigStore, KeyConfigStore, VaultError};
