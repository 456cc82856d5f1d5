//! 用户设置持久化
//!
//! 单文件 JSON。读取失败（不存在、不可读、解析失败）一律回退默认值，不报错；
//! 写入为整体替换：只落盘调用方给定的字段。

use std::path::{Path, PathBuf};

use crate::core::{Settings, SettingsRecord, ZokerError};

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取设置；文件不存在时写入默认记录后返回默认值，损坏时仅返回默认值（不覆盖原文件）
    pub fn load(&self) -> Settings {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = Settings::default();
                if let Err(e) = self.save(&SettingsRecord::from(&defaults)) {
                    tracing::warn!(error = %e, "could not create default settings");
                }
                return defaults;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings unreadable, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str::<SettingsRecord>(&data) {
            Ok(record) => record.resolve(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings corrupt, using defaults");
                Settings::default()
            }
        }
    }

    /// 用给定记录整体替换设置文件；父目录不存在时自动创建
    pub fn save(&self, record: &SettingsRecord) -> Result<(), ZokerError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let json = serde_json::to_string_pretty(record)?;
            std::fs::write(&self.path, json)
        };
        write().map_err(|e| ZokerError::SettingsWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
