//! 持久化：用户设置、自身脚本、动作日志

pub mod action_log;
pub mod self_image;
pub mod settings;

pub use action_log::ActionLog;
pub use self_image::SelfImage;
pub use settings::SettingsStore;
