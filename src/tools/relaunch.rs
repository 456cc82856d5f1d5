//! 重启：以子进程启动新版本脚本
//!
//! 命令为 `<program> <args...> <entrypoint>`；子进程启动成功即返回，不等待其退出，
//! 退出状态由后台任务记录到 tracing。
//! 子进程的 stdin 接 /dev/null：命令循环仍在读取终端输入，不能与子进程共享。

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::ZokerError;

#[async_trait]
pub trait Relauncher: Send + Sync {
    /// 启动新执行，返回子进程 pid（平台不提供时为 None）
    async fn relaunch(&self, entrypoint: &Path) -> Result<Option<u32>, ZokerError>;
}

pub struct ProcessRelauncher {
    program: String,
    args: Vec<String>,
}

impl ProcessRelauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Relauncher for ProcessRelauncher {
    async fn relaunch(&self, entrypoint: &Path) -> Result<Option<u32>, ZokerError> {
        tracing::info!(program = %self.program, entrypoint = %entrypoint.display(), "relaunch");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(entrypoint)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| ZokerError::Relaunch(format!("{}: {}", self.program, e)))?;

        let pid = child.id();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::info!(?pid, %status, "relaunched process exited"),
                Err(e) => tracing::warn!(?pid, error = %e, "wait on relaunched process failed"),
            }
        });
        Ok(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relaunch_passes_entrypoint_last() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker.txt");
        let relauncher = ProcessRelauncher::new(
            "sh",
            vec!["-c".to_string(), "echo \"$0\" > \"$(dirname \"$0\")/marker.txt\"".to_string()],
        );
        let entry = dir.path().join("zoker.py");

        relauncher.relaunch(&entry).await.unwrap();

        let mut written = String::new();
        for _ in 0..50 {
            if let Ok(s) = std::fs::read_to_string(&marker) {
                if !s.is_empty() {
                    written = s;
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(written.trim(), entry.display().to_string());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relaunched_child_does_not_read_parent_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("stdin.txt");
        // read 遇到 EOF 时返回非零，line 为空
        let relauncher = ProcessRelauncher::new(
            "sh",
            vec![
                "-c".to_string(),
                "read line; echo \"got:$line\" > \"$(dirname \"$0\")/stdin.txt\"".to_string(),
            ],
        );

        relauncher.relaunch(&dir.path().join("zoker.py")).await.unwrap();

        let mut written = String::new();
        for _ in 0..50 {
            if let Ok(s) = std::fs::read_to_string(&marker) {
                if !s.is_empty() {
                    written = s;
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(written.trim(), "got:");
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let relauncher = ProcessRelauncher::new("zoker-no-such-program-xyz", Vec::new());
        let err = relauncher.relaunch(Path::new("zoker.py")).await.unwrap_err();
        assert!(matches!(err, ZokerError::Relaunch(_)));
    }
}
