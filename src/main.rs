//! Zoker - 自我更新的智能体
//!
//! 入口：初始化日志、加载部署配置、组装流水线，并在 stdin/stdout 上运行命令循环。

use anyhow::Context;
use tokio::io::BufReader;
use zoker::config::{load_config, AppConfig};
use zoker::core::ZokerError;
use zoker::{observability, ZokerBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None)
        .map_err(|e| ZokerError::Config(e.to_string()))
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            AppConfig::default()
        });

    let control = ZokerBuilder::new(cfg).build();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    control
        .run(stdin, &mut stdout)
        .await
        .context("Command loop failed")?;

    Ok(())
}
