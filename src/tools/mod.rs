pub mod git_publish;
pub mod rate_limit;
pub mod relaunch;
pub mod search;

pub use git_publish::{GitPublisher, PublishSink};
pub use rate_limit::MinIntervalGate;
pub use relaunch::{ProcessRelauncher, Relauncher};
pub use search::{ContentSource, PageFetcher, ScrapedContent, WebFetcher};
