//! 动作日志：每条一行 `<YYYY-MM-DD HH:MM:SS> - <action>`，只追加不改写

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::ZokerError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, action: &str) -> Result<(), ZokerError> {
        let line = format!("{} - {}\n", timestamp(), action);
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()))
            .map_err(|e| ZokerError::ActionLogWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_timestamped_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActionLog::new(dir.path().join("zoker_log.txt"));

        log.append("first").unwrap();
        log.append("second").unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for (line, action) in lines.iter().zip(["first", "second"]) {
            let (stamp, rest) = line.split_once(" - ").unwrap();
            assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
            assert_eq!(rest, action);
        }
    }

    #[test]
    fn test_existing_content_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoker_log.txt");
        std::fs::write(&path, "2020-01-01 00:00:00 - old\n").unwrap();

        ActionLog::new(&path).append("new").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("2020-01-01 00:00:00 - old\n"));
        assert!(content.ends_with(" - new\n"));
    }

    #[test]
    fn test_unwritable_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActionLog::new(dir.path().join("missing_dir/zoker_log.txt"));
        assert!(matches!(log.append("x"), Err(ZokerError::ActionLogWrite(_))));
    }
}
