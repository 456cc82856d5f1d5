//! 流水线错误类型与阶段恢复策略
//!
//! 每个组件边界返回 ZokerError；调用方通过 kind() 区分错误类别，通过 recovery()
//! 决定是「静默降级继续」还是「提示操作者」。任何错误都不会越过命令循环。

use std::path::PathBuf;

use thiserror::Error;

/// 组件边界上的错误
#[derive(Error, Debug)]
pub enum ZokerError {
    #[error("Failed to write settings {}: {}", .path.display(), .reason)]
    SettingsWrite { path: PathBuf, reason: String },

    #[error("Self image not found: {}", .0.display())]
    SelfImageMissing(PathBuf),

    /// 文件存在但不是合法 UTF-8，附带底层原因
    #[error("Unicode decode error in {}: {}", .path.display(), .reason)]
    SelfImageDecode { path: PathBuf, reason: String },

    #[error("Failed to read self image {}: {}", .path.display(), .reason)]
    SelfImageRead { path: PathBuf, reason: String },

    #[error("Error writing to {}: {}", .path.display(), .reason)]
    SelfImageWrite { path: PathBuf, reason: String },

    #[error("Error logging action: {0}")]
    ActionLogWrite(String),

    #[error("Failed to fetch {location}: HTTP Status {status}")]
    FetchStatus { location: String, status: u16 },

    #[error("Error scraping {location}: {reason}")]
    FetchFailed { location: String, reason: String },

    #[error("Publish step `{step}` failed: {reason}")]
    Publish { step: PublishStep, reason: String },

    #[error("Error running updated script: {0}")]
    Relaunch(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// 发布流程中的步骤，用于定位失败点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Clone,
    Copy,
    Add,
    Commit,
    Push,
}

impl std::fmt::Display for PublishStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStep::Clone => write!(f, "clone"),
            PublishStep::Copy => write!(f, "copy"),
            PublishStep::Add => write!(f, "add"),
            PublishStep::Commit => write!(f, "commit"),
            PublishStep::Push => write!(f, "push"),
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 设置缺失/损坏：本地回退默认值，不视为失败
    Configuration,
    /// 本地文件读写失败
    Io,
    /// 外部协作方失败（抓取、发布、重启）
    Collaborator,
    /// 自身脚本无法解码
    Encoding,
}

/// 阶段失败后的建议动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRecovery {
    /// 预期内的降级，记录后继续
    Continue,
    /// 继续执行，但需要提示操作者
    Alert,
}

impl ZokerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZokerError::Config(_) => ErrorKind::Configuration,
            ZokerError::SettingsWrite { .. }
            | ZokerError::SelfImageMissing(_)
            | ZokerError::SelfImageRead { .. }
            | ZokerError::SelfImageWrite { .. }
            | ZokerError::ActionLogWrite(_) => ErrorKind::Io,
            ZokerError::SelfImageDecode { .. } => ErrorKind::Encoding,
            ZokerError::FetchStatus { .. }
            | ZokerError::FetchFailed { .. }
            | ZokerError::Publish { .. }
            | ZokerError::Relaunch(_) => ErrorKind::Collaborator,
        }
    }

    pub fn recovery(&self) -> StageRecovery {
        match self.kind() {
            ErrorKind::Configuration | ErrorKind::Collaborator => StageRecovery::Continue,
            ErrorKind::Io | ErrorKind::Encoding => StageRecovery::Alert,
        }
    }
}
