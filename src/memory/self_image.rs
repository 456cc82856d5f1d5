//! 自身脚本：读取与整体替换
//!
//! 读：区分「文件不存在」与「无法按 UTF-8 解码」。
//! 写：内容先经过 sanitize；可选先备份为 `<path>.bak`；通过同目录临时文件 + rename 替换，
//! 调用方看到的要么是旧版本，要么是完整的新版本。

use std::path::{Path, PathBuf};

use crate::core::ZokerError;
use crate::sanitize::sanitize;

#[derive(Debug, Clone)]
pub struct SelfImage {
    path: PathBuf,
    backup_before_write: bool,
}

impl SelfImage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            backup_before_write: true,
        }
    }

    /// 是否在覆盖前备份旧版本
    pub fn with_backup(mut self, enable: bool) -> Self {
        self.backup_before_write = enable;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn read(&self) -> Result<String, ZokerError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ZokerError::SelfImageMissing(self.path.clone())
            } else {
                ZokerError::SelfImageRead {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        String::from_utf8(bytes).map_err(|e| ZokerError::SelfImageDecode {
            path: self.path.clone(),
            reason: e.utf8_error().to_string(),
        })
    }

    /// 用 sanitize 后的内容整体替换自身脚本
    pub fn write(&self, text: &str) -> Result<(), ZokerError> {
        let cleaned = sanitize(text);
        self.replace(&cleaned).map_err(|e| ZokerError::SelfImageWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn replace(&self, content: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if self.backup_before_write && self.path.is_file() {
            std::fs::copy(&self.path, self.backup_path())?;
        }
        let mut tmp = self.path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path).inspect_err(|_| {
            let _ = std::fs::remove_file(&tmp);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing() {
        let dir = tempfile::tempdir().unwrap();
        let image = SelfImage::new(dir.path().join("zoker.py"));
        assert!(matches!(image.read(), Err(ZokerError::SelfImageMissing(_))));
    }

    #[test]
    fn test_read_unreadable_is_distinct_from_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelfImage::new(dir.path()).read().unwrap_err();
        assert!(matches!(err, ZokerError::SelfImageRead { .. }));
        assert_eq!(err.kind(), crate::core::ErrorKind::Io);
    }

    #[test]
    fn test_read_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoker.py");
        std::fs::write(&path, [b'o', b'k', 0xff, 0xfe]).unwrap();

        let err = SelfImage::new(&path).read().unwrap_err();
        match err {
            ZokerError::SelfImageDecode { reason, .. } => assert!(reason.contains("index 2")),
            other => panic!("Expected SelfImageDecode, got {:?}", other),
        }
    }

    #[test]
    fn test_write_sanitizes_and_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoker.py");
        std::fs::write(&path, "print('v1')\n").unwrap();

        let image = SelfImage::new(&path);
        image.write("# v2 — café\n").unwrap();

        assert_eq!(image.read().unwrap(), "# v2   caf \n");
        assert_eq!(
            std::fs::read_to_string(image.backup_path()).unwrap(),
            "print('v1')\n"
        );
        assert!(!dir.path().join("zoker.py.tmp").exists());
    }

    #[test]
    fn test_write_without_backup_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = SelfImage::new(dir.path().join("sub/zoker.py")).with_backup(false);

        image.write("fresh").unwrap();
        assert_eq!(image.read().unwrap(), "fresh");
        assert!(!image.backup_path().exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoker.py");
        std::fs::create_dir_all(&path).unwrap();

        let err = SelfImage::new(&path).with_backup(false).write("x").unwrap_err();
        assert!(matches!(err, ZokerError::SelfImageWrite { .. }));
    }
}
