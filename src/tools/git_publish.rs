//! 发布：把新版本脚本提交并推送到远程仓库
//!
//! 本地工作副本不存在时先 clone；脚本不在工作副本内时按文件名复制到工作副本根目录；
//! 然后 git add / commit / push。每一步失败都带上步骤名返回。
//! 内容未变化时仍然提交（--allow-empty）并推送，之前推送失败的版本会在下次发布时补推。

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::{PublishStep, ZokerError};

/// 发布目标：持久记录新版本并对外可见
#[async_trait]
pub trait PublishSink: Send + Sync {
    async fn publish(&self, path: &Path) -> Result<String, ZokerError>;
}

pub struct GitPublisher {
    remote_url: String,
    local_path: PathBuf,
    remote: String,
    commit_message: String,
    /// 提交者身份（name, email）；None 时沿用 git 自身配置
    identity: Option<(String, String)>,
}

impl GitPublisher {
    pub fn new(
        remote_url: impl Into<String>,
        local_path: impl AsRef<Path>,
        remote: impl Into<String>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            remote_url: remote_url.into(),
            local_path: local_path.as_ref().to_path_buf(),
            remote: remote.into(),
            commit_message: commit_message.into(),
            identity: None,
        }
    }

    pub fn with_identity(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.identity = Some((name.into(), email.into()));
        self
    }

    async fn git<I, S>(&self, step: PublishStep, args: I, cwd: Option<&Path>) -> Result<String, ZokerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new("git");
        if let Some((name, email)) = &self.identity {
            cmd.arg("-c")
                .arg(format!("user.name={}", name))
                .arg("-c")
                .arg(format!("user.email={}", email));
        }
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output().await.map_err(|e| ZokerError::Publish {
            step,
            reason: format!("Failed to run git {}: {}", step, e),
        })?;
        if !output.status.success() {
            return Err(ZokerError::Publish {
                step,
                reason: format!("git {} failed: {}", step, failure_output(&output.stderr, &output.stdout)),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// 确定要暂存的相对路径，必要时把脚本复制进工作副本
    fn stage_target(&self, path: &Path) -> Result<PathBuf, ZokerError> {
        if let Some(rel) = relative_to(path, &self.local_path) {
            return Ok(rel);
        }
        let copy_err = |reason: String| ZokerError::Publish {
            step: PublishStep::Copy,
            reason,
        };
        let name = path
            .file_name()
            .ok_or_else(|| copy_err(format!("No file name in {}", path.display())))?;
        std::fs::copy(path, self.local_path.join(name))
            .map_err(|e| copy_err(format!("{} -> {}: {}", path.display(), self.local_path.display(), e)))?;
        Ok(PathBuf::from(name))
    }
}

/// git 失败时的说明：优先 stderr，为空时用 stdout（如 "nothing to commit"）
fn failure_output(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    String::from_utf8_lossy(stdout).trim().to_string()
}

/// path 位于 root 内时返回相对路径
fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    let path = std::fs::canonicalize(path).ok()?;
    let root = std::fs::canonicalize(root).ok()?;
    path.strip_prefix(&root).ok().map(Path::to_path_buf)
}

#[async_trait]
impl PublishSink for GitPublisher {
    async fn publish(&self, path: &Path) -> Result<String, ZokerError> {
        if !self.local_path.exists() {
            tracing::info!(remote = %self.remote_url, "cloning working copy");
            self.git(
                PublishStep::Clone,
                [OsStr::new("clone"), OsStr::new(&self.remote_url), self.local_path.as_os_str()],
                None,
            )
            .await?;
        }

        let target = self.stage_target(path)?;
        let cwd = Some(self.local_path.as_path());

        self.git(PublishStep::Add, [OsStr::new("add"), target.as_os_str()], cwd)
            .await?;
        self.git(
            PublishStep::Commit,
            ["commit", "--allow-empty", "-m", self.commit_message.as_str()],
            cwd,
        )
        .await?;
        self.git(PublishStep::Push, ["push", self.remote.as_str(), "HEAD"], cwd)
            .await?;

        tracing::info!(file = %target.display(), remote = %self.remote, "published");
        Ok(format!("✓ Committed: {}", self.commit_message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_git(args: &[&str], cwd: &Path) -> String {
        let output = std::process::Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?}: {}", args, String::from_utf8_lossy(&output.stderr));
        String::from_utf8(output.stdout).unwrap()
    }

    #[test]
    fn test_failure_output_falls_back_to_stdout() {
        assert_eq!(failure_output(b"fatal: bad\n", b"ignored"), "fatal: bad");
        assert_eq!(
            failure_output(b"  \n", b"nothing to commit, working tree clean\n"),
            "nothing to commit, working tree clean"
        );
    }

    #[tokio::test]
    async fn test_publish_clones_commits_and_pushes_even_when_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("remote.git");
        std::fs::create_dir_all(&remote).unwrap();
        run_git(&["init", "--bare", "--quiet"], &remote);

        let script = dir.path().join("zoker.py");
        std::fs::write(&script, "# AI-Generated Improvements\n\nhello").unwrap();
        let publisher = GitPublisher::new(
            remote.display().to_string(),
            dir.path().join("work"),
            "origin",
            "Auto-update",
        )
        .with_identity("Zoker", "zoker@localhost");

        let summary = publisher.publish(&script).await.unwrap();
        assert_eq!(summary, "✓ Committed: Auto-update");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("work/zoker.py")).unwrap(),
            "# AI-Generated Improvements\n\nhello"
        );

        let head = run_git(&["rev-list", "--all", "--max-count=1"], &remote);
        let pushed = run_git(&["show", &format!("{}:zoker.py", head.trim())], &remote);
        assert_eq!(pushed, "# AI-Generated Improvements\n\nhello");

        // 内容不变再发布一次：仍然提交并推送
        publisher.publish(&script).await.unwrap();
        let subjects = run_git(&["log", "--all", "--format=%s"], &remote);
        assert_eq!(subjects.lines().collect::<Vec<_>>(), vec!["Auto-update", "Auto-update"]);
    }

    #[test]
    fn test_relative_to_inside_and_outside() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(repo.join("src")).unwrap();
        let inside = repo.join("src/zoker.py");
        let outside = dir.path().join("zoker.py");
        std::fs::write(&inside, "x").unwrap();
        std::fs::write(&outside, "y").unwrap();

        assert_eq!(relative_to(&inside, &repo), Some(PathBuf::from("src/zoker.py")));
        assert_eq!(relative_to(&outside, &repo), None);
    }

    #[test]
    fn test_stage_target_copies_outside_file_into_working_copy() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(&repo).unwrap();
        let script = dir.path().join("zoker.py");
        std::fs::write(&script, "# new version").unwrap();

        let publisher = GitPublisher::new("unused", &repo, "origin", "msg");
        let target = publisher.stage_target(&script).unwrap();

        assert_eq!(target, PathBuf::from("zoker.py"));
        assert_eq!(
            std::fs::read_to_string(repo.join("zoker.py")).unwrap(),
            "# new version"
        );
    }

    #[test]
    fn test_stage_target_missing_script_is_copy_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(&repo).unwrap();

        let publisher = GitPublisher::new("unused", &repo, "origin", "msg");
        let err = publisher.stage_target(&dir.path().join("gone.py")).unwrap_err();
        assert!(matches!(
            err,
            ZokerError::Publish {
                step: PublishStep::Copy,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails_at_clone() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("zoker.py");
        std::fs::write(&script, "x").unwrap();

        let publisher = GitPublisher::new(
            dir.path().join("no-such-remote").display().to_string(),
            dir.path().join("repo"),
            "origin",
            "msg",
        );
        let err = publisher.publish(&script).await.unwrap_err();
        assert!(matches!(
            err,
            ZokerError::Publish {
                step: PublishStep::Clone,
                ..
            }
        ));
    }
}
