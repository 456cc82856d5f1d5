//! learn / improve 两条流水线
//!
//! 两条流水线都先读设置，只有 status == running 才执行。
//! improve 按「读自身 → 抓取 → 重写自身 → 发布 → 重启」顺序执行，每个阶段的失败都在阶段边界
//! 被记录并打印，后续阶段照常执行（尽力而为，不是事务）。

use std::io::Write;
use std::sync::Arc;

use crate::core::{StageRecovery, ZokerError};
use crate::memory::{ActionLog, SelfImage, SettingsStore};
use crate::tools::search::truncate_chars;
use crate::tools::{ContentSource, PublishSink, Relauncher};

pub const PAUSED_NOTICE: &str = "AI is paused. Change config to start.";

/// 向控制台输出一行；控制台写失败不影响流水线
pub(crate) fn say(out: &mut dyn Write, line: impl std::fmt::Display) {
    if let Err(e) = writeln!(out, "{}", line) {
        tracing::debug!(error = %e, "console write failed");
    }
}

/// 打印阶段错误：需要提示的错误加 ⚠️ 前缀并以 error 级别记录
pub(crate) fn print_error(out: &mut dyn Write, err: &ZokerError) {
    match err.recovery() {
        StageRecovery::Continue => {
            tracing::warn!(kind = ?err.kind(), error = %err, "stage degraded");
            say(out, err);
        }
        StageRecovery::Alert => {
            tracing::error!(kind = ?err.kind(), error = %err, "stage failed");
            say(out, format!("⚠️ {}", err));
        }
    }
}

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadSelf,
    Fetch,
    WriteSelf,
    Publish,
    Relaunch,
    Log,
}

#[derive(Debug)]
pub struct StageOutcome {
    pub stage: Stage,
    pub error: Option<ZokerError>,
}

/// 一次流水线执行的结果（只存在于调用栈上，不持久化）
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// 因暂停而未执行
    pub skipped: bool,
    pub stages: Vec<StageOutcome>,
    /// 抓取到的内容
    pub content: String,
}

impl PipelineReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn attempted(&self, stage: Stage) -> bool {
        self.stages.iter().any(|s| s.stage == stage)
    }

    pub fn failed(&self, stage: Stage) -> bool {
        self.stages
            .iter()
            .any(|s| s.stage == stage && s.error.is_some())
    }

    fn record(&mut self, stage: Stage, result: Result<(), ZokerError>) {
        self.stages.push(StageOutcome {
            stage,
            error: result.err(),
        });
    }
}

/// 流水线：持有全部协作方，由 ControlLoop 调用
pub struct Pipeline {
    settings: SettingsStore,
    self_image: SelfImage,
    action_log: ActionLog,
    source: ContentSource,
    publisher: Arc<dyn PublishSink>,
    relauncher: Arc<dyn Relauncher>,
    locations: Vec<String>,
    header: String,
    excerpt_chars: usize,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: SettingsStore,
        self_image: SelfImage,
        action_log: ActionLog,
        source: ContentSource,
        publisher: Arc<dyn PublishSink>,
        relauncher: Arc<dyn Relauncher>,
        locations: Vec<String>,
        header: String,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            settings,
            self_image,
            action_log,
            source,
            publisher,
            relauncher,
            locations,
            header,
            excerpt_chars,
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn self_image(&self) -> &SelfImage {
        &self.self_image
    }

    fn log(&self, out: &mut dyn Write, report: &mut PipelineReport, action: &str) {
        if let Err(e) = self.action_log.append(action) {
            print_error(out, &e);
            report.record(Stage::Log, Err(e));
        }
    }

    /// learn：抓取内容，打印并记录摘录；不改动自身脚本
    pub async fn learn(&self, out: &mut dyn Write) -> PipelineReport {
        if !self.settings.load().is_running() {
            say(out, PAUSED_NOTICE);
            return PipelineReport::skipped();
        }
        let mut report = PipelineReport::default();

        say(out, "🔍 Scraping websites for code improvements...");
        let content = self.source.fetch(&self.locations).await;
        for failure in &content.failures {
            print_error(out, failure);
        }
        report.record(Stage::Fetch, Ok(()));

        let excerpt = truncate_chars(&content.text, self.excerpt_chars);
        if content.is_empty() {
            say(out, "No improvements found.");
        } else {
            say(out, format!("Scraped improvements:\n{}...", excerpt));
        }
        self.log(
            out,
            &mut report,
            &format!("Scraped code improvements:\n{}...", excerpt),
        );

        report.content = content.text;
        report
    }

    /// improve：读自身 → 抓取 → 重写自身 → 发布 → 重启
    pub async fn improve(&self, out: &mut dyn Write) -> PipelineReport {
        if !self.settings.load().is_running() {
            say(out, PAUSED_NOTICE);
            return PipelineReport::skipped();
        }
        let mut report = PipelineReport::default();

        say(out, "🔍 Reading AI's own code...");
        // 读到的旧版本目前不参与新版本的生成
        match self.self_image.read() {
            Ok(code) => {
                tracing::debug!(chars = code.chars().count(), "read self image");
                self.log(out, &mut report, &format!("Read own code ({} chars)", code.chars().count()));
                report.record(Stage::ReadSelf, Ok(()));
            }
            Err(e) => {
                print_error(out, &e);
                self.log(out, &mut report, &format!("Reading own code failed: {}", e));
                report.record(Stage::ReadSelf, Err(e));
            }
        }

        say(out, "🛠 Scraping code improvements from the web...");
        let content = self.source.fetch(&self.locations).await;
        for failure in &content.failures {
            print_error(out, failure);
        }
        self.log(
            out,
            &mut report,
            &format!(
                "Scraped {} chars from {}/{} locations",
                content.text.chars().count(),
                content.succeeded,
                self.locations.len()
            ),
        );
        report.record(Stage::Fetch, Ok(()));

        say(out, "💾 Writing new code...");
        let new_image = format!("{}{}", self.header, content.text);
        let written = self.self_image.write(&new_image);
        match &written {
            Ok(()) => self.log(out, &mut report, &format!("Wrote new code to {}", self.self_image.path().display())),
            Err(e) => {
                print_error(out, e);
                self.log(out, &mut report, &format!("Writing new code failed: {}", e));
            }
        }
        report.record(Stage::WriteSelf, written);

        say(out, "⬆️ Pushing to GitHub...");
        let published = self.publisher.publish(self.self_image.path()).await;
        match &published {
            Ok(summary) => self.log(out, &mut report, &format!("Published new version: {}", summary)),
            Err(e) => {
                print_error(out, e);
                self.log(out, &mut report, &format!("Publishing failed: {}", e));
            }
        }
        report.record(Stage::Publish, published.map(|_| ()));

        say(out, "🚀 Running updated AI...");
        let relaunched = self.relauncher.relaunch(self.self_image.path()).await;
        match &relaunched {
            Ok(pid) => {
                let pid = pid.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string());
                self.log(out, &mut report, &format!("Relaunched updated script (pid {})", pid));
            }
            Err(e) => {
                print_error(out, e);
                self.log(out, &mut report, &format!("Relaunch failed: {}", e));
            }
        }
        report.record(Stage::Relaunch, relaunched.map(|_| ()));

        report.content = content.text;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedConsole;

    impl Write for ClosedConsole {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_write_failure_does_not_stop_output() {
        let mut closed = ClosedConsole;
        say(&mut closed, "lost line");
        print_error(&mut closed, &ZokerError::ActionLogWrite("disk full".to_string()));

        let mut out: Vec<u8> = Vec::new();
        say(&mut out, "kept line");
        print_error(&mut out, &ZokerError::ActionLogWrite("disk full".to_string()));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("kept line\n"));
        assert!(text.contains("⚠️ Error logging action: disk full"));
    }
}
