//! 构建器：由 AppConfig 组装各协作方，得到可运行的 ControlLoop
//!
//! 默认使用真实实现（reqwest 抓取、git CLI 发布、子进程重启）；测试可逐个替换。

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{ControlLoop, Pipeline};
use crate::memory::{ActionLog, SelfImage, SettingsStore};
use crate::tools::{
    ContentSource, GitPublisher, MinIntervalGate, PageFetcher, ProcessRelauncher, PublishSink,
    Relauncher, WebFetcher,
};

pub struct ZokerBuilder {
    config: AppConfig,
    fetcher: Option<Arc<dyn PageFetcher>>,
    publisher: Option<Arc<dyn PublishSink>>,
    relauncher: Option<Arc<dyn Relauncher>>,
}

impl ZokerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            fetcher: None,
            publisher: None,
            relauncher: None,
        }
    }

    /// 替换网页抓取实现
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// 替换发布实现
    pub fn with_publisher(mut self, publisher: Arc<dyn PublishSink>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// 替换重启实现
    pub fn with_relauncher(mut self, relauncher: Arc<dyn Relauncher>) -> Self {
        self.relauncher = Some(relauncher);
        self
    }

    pub fn build_pipeline(self) -> Pipeline {
        let cfg = self.config;

        let fetcher = self.fetcher.unwrap_or_else(|| {
            Arc::new(WebFetcher::new(&cfg.scrape.user_agent, cfg.scrape.timeout_secs))
        });
        let source = ContentSource::new(
            fetcher,
            MinIntervalGate::new(Duration::from_millis(cfg.scrape.min_interval_ms)),
            cfg.scrape.max_chars_per_location,
        );
        let publisher = self.publisher.unwrap_or_else(|| {
            let publisher = GitPublisher::new(
                cfg.publish.remote_url.clone(),
                &cfg.publish.local_path,
                cfg.publish.remote.clone(),
                cfg.publish.commit_message.clone(),
            );
            let publisher = match (&cfg.publish.author_name, &cfg.publish.author_email) {
                (Some(name), Some(email)) => publisher.with_identity(name, email),
                _ => publisher,
            };
            Arc::new(publisher)
        });
        let relauncher = self.relauncher.unwrap_or_else(|| {
            Arc::new(ProcessRelauncher::new(
                cfg.relaunch.program.clone(),
                cfg.relaunch.args.clone(),
            ))
        });

        Pipeline::new(
            SettingsStore::new(&cfg.app.settings_path),
            SelfImage::new(&cfg.self_image.path).with_backup(cfg.self_image.backup_before_write),
            ActionLog::new(&cfg.app.action_log_path),
            source,
            publisher,
            relauncher,
            cfg.scrape.locations,
            cfg.self_image.header,
            cfg.scrape.excerpt_chars,
        )
    }

    pub fn build(self) -> ControlLoop {
        ControlLoop::new(self.build_pipeline())
    }
}
