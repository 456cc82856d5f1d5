//! 主控循环：逐行读取命令并分发
//!
//! 命令（忽略大小写与首尾空白）：start / stop / status / improve / exit，其他输入给出用法提示。
//! 任何阶段的失败都只打印，循环始终回到等待下一条命令；输入结束等同于 exit。

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::core::pipeline::{print_error, say, Pipeline};
use crate::core::SettingsRecord;

pub const PROMPT: &str = "\nEnter command (start/stop/status/exit/improve): ";
pub const USAGE: &str = "Invalid command. Please enter one of: start, stop, status, exit, improve.";

/// 用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 设为 running 并执行 learn
    Start,
    /// 设为 paused
    Stop,
    Status,
    Improve,
    Exit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let token = line.trim().to_lowercase();
        match token.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "status" => Command::Status,
            "improve" => Command::Improve,
            "exit" => Command::Exit,
            _ => Command::Unknown(token),
        }
    }
}

/// dispatch 之后循环是否继续
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct ControlLoop {
    pipeline: Pipeline,
}

impl ControlLoop {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub async fn dispatch(&self, command: Command, out: &mut dyn Write) -> Flow {
        tracing::debug!(?command, "dispatch");
        match command {
            Command::Start => {
                if let Err(e) = self.pipeline.settings().save(&SettingsRecord::started()) {
                    print_error(out, &e);
                }
                self.pipeline.learn(out).await;
            }
            Command::Stop => {
                match self.pipeline.settings().save(&SettingsRecord::paused()) {
                    Ok(()) => say(out, "AI stopped."),
                    Err(e) => print_error(out, &e),
                }
            }
            Command::Status => {
                let settings = self.pipeline.settings().load();
                say(out, format!("AI Status: {}", settings.status));
            }
            Command::Improve => {
                self.pipeline.improve(out).await;
            }
            Command::Exit => return Flow::Exit,
            Command::Unknown(_) => say(out, USAGE),
        }
        Flow::Continue
    }

    /// 交互循环：打印提示、读一行、分发，直到 exit 或输入结束
    pub async fn run<R>(&self, input: R, out: &mut dyn Write) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                tracing::info!("input closed, exiting");
                break;
            };
            if self.dispatch(Command::parse(&line), out).await == Flow::Exit {
                break;
            }
        }
        Ok(())
    }
}
