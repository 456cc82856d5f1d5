//! 状态定义：运行状态机与用户设置记录
//!
//! Running / Paused 两个状态持久化在设置文件的 `status` 字段；只有显式的用户命令才会改变它。

use serde::{Deserialize, Serialize};

/// 运行状态：决定 learn / improve 流水线是否执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Running,
    Paused,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Paused => write!(f, "paused"),
        }
    }
}

/// 学习速度：仅作提示，不参与流水线逻辑
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningSpeed {
    Low,
    #[default]
    Medium,
    High,
}

/// `last_update` 从未写入时的取值
pub const NEVER_UPDATED: &str = "never";

/// 读取后的完整设置（缺失字段已填默认值）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub learning_speed: LearningSpeed,
    pub status: RunStatus,
    pub last_update: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            learning_speed: LearningSpeed::Medium,
            status: RunStatus::Running,
            last_update: NEVER_UPDATED.to_string(),
        }
    }
}

impl Settings {
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}

/// 落盘的设置记录：只写出调用方给定的字段（整体替换，不与旧记录合并）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_speed: Option<LearningSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

impl SettingsRecord {
    /// `start` 命令写入的记录
    pub fn started() -> Self {
        Self {
            learning_speed: Some(LearningSpeed::Medium),
            status: Some(RunStatus::Running),
            last_update: None,
        }
    }

    /// `stop` 命令写入的记录
    pub fn paused() -> Self {
        Self {
            status: Some(RunStatus::Paused),
            ..Self::default()
        }
    }

    /// 缺失字段取默认值
    pub fn resolve(self) -> Settings {
        let defaults = Settings::default();
        Settings {
            learning_speed: self.learning_speed.unwrap_or(defaults.learning_speed),
            status: self.status.unwrap_or(defaults.status),
            last_update: self.last_update.unwrap_or(defaults.last_update),
        }
    }
}

impl From<&Settings> for SettingsRecord {
    fn from(s: &Settings) -> Self {
        Self {
            learning_speed: Some(s.learning_speed),
            status: Some(s.status),
            last_update: Some(s.last_update.clone()),
        }
    }
}
