//! Vault 配置存储
//!
//! 每个配置一个 `<id>.json` 文件. 创建使用 create-new 打开文件,
//! 并发创建同名配置时只有一个会成功.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::core::models::KeyConfig;

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

// Windows 设备名, 即使符合字符白名单也不能作为文件名
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// 文件名安全检查: 仅字母, 数字, 下划线, 且不是保留设备名
pub fn is_valid_identifier(id: &str) -> bool {
    if !IDENTIFIER_RE.is_match(id) {
        return false;
    }
    let upper = id.to_ascii_uppercase();
    !RESERVED_NAMES.contains(&upper.as_str())
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("非法的配置名: {0:?}")]
    InvalidIdentifier(String),

    #[error("配置已存在: {0}")]
    AlreadyExists(String),

    #[error("读写配置失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化配置失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 配置存储接口
pub trait KeyConfigStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<KeyConfig>, VaultError>;

    /// 仅当不存在时写入
    fn put_if_absent(&self, id: &str, config: &KeyConfig) -> Result<(), VaultError>;

    /// 幂等删除
    fn delete(&self, id: &str) -> Result<(), VaultError>;

    /// 列出全部可解析的配置, 解析失败的条目被跳过
    fn list(&self) -> Result<BTreeMap<String, KeyConfig>, VaultError>;
}

/// 基于目录的配置存储
pub struct FileKeyConfigStore {
    dir: PathBuf,
}

impl FileKeyConfigStore {
    pub fn new(dir: PathBuf) -> Result<Self, VaultError> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, VaultError> {
        if !is_valid_identifier(id) {
            return Err(VaultError::InvalidIdentifier(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

impl KeyConfigStore for FileKeyConfigStore {
    fn get(&self, id: &str) -> Result<Option<KeyConfig>, VaultError> {
        let path = self.path_for(id)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put_if_absent(&self, id: &str, config: &KeyConfig) -> Result<(), VaultError> {
        let path = self.path_for(id)?;
        let content = serde_json::to_vec_pretty(config)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(VaultError::AlreadyExists(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(&content).and_then(|_| file.sync_all()) {
            // 不留下半截文件, 否则该名字会被永久占用
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        tracing::info!("Created key config {}", id);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), VaultError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Deleted key config {}", id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<BTreeMap<String, KeyConfig>, VaultError> {
        let mut configs = BTreeMap::new();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(configs),
            Err(e) => return Err(e.into()),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_identifier(id) {
                tracing::warn!("Skipping vault file with invalid name: {:?}", path);
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(VaultError::from)
                .and_then(|content| Ok(serde_json::from_str::<KeyConfig>(&content)?));
            match parsed {
                Ok(config) => {
                    configs.insert(id.to_string(), config);
                }
                Err(e) => {
                    tracing::warn!("加载配置 {} 失败: {}", id, e);
                }
            }
        }

        Ok(configs)
    }
}
