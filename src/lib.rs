//! Zoker - 自我更新的智能体
//!
//! 模块划分：
//! - **config**: 部署配置加载（TOML + 环境变量）
//! - **core**: 运行状态、错误分类、learn / improve 流水线、主控循环
//! - **memory**: 用户设置、自身脚本、动作日志的持久化
//! - **observability**: tracing 初始化
//! - **sanitize**: 文本清洗
//! - **tools**: 外部协作方（网页抓取、请求限速、Git 发布、子进程重启）

pub mod config;
pub mod core;
pub mod memory;
pub mod observability;
pub mod sanitize;
pub mod tools;

pub use crate::core::{ControlLoop, ZokerBuilder};
