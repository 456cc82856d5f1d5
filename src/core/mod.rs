//! 核心编排层：错误分类、运行状态、流水线、主控循环

pub mod builder;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod state;

pub use builder::ZokerBuilder;
pub use control::{Command, ControlLoop, Flow};
pub use error::{ErrorKind, PublishStep, StageRecovery, ZokerError};
pub use pipeline::{Pipeline, PipelineReport, Stage, StageOutcome};
pub use state::{LearningSpeed, RunStatus, Settings, SettingsRecord, NEVER_UPDATED};
