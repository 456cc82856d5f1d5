//! 部署配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ZOKER__*` 覆盖（双下划线表示嵌套，如 `ZOKER__SCRAPE__MIN_INTERVAL_MS=500`）。
//! 所有路径、URL、抓取地址都集中在这里，构造各组件时显式传入，测试可替换为临时目录。

use std::path::PathBuf;

use serde::Deserialize;

/// 部署配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub self_image: SelfImageSection,
    #[serde(default)]
    pub scrape: ScrapeSection,
    #[serde(default)]
    pub publish: PublishSection,
    #[serde(default)]
    pub relaunch: RelaunchSection,
}

/// [app] 段：用户设置文件与动作日志位置
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// 用户设置（status / learning_speed / last_update），JSON
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
    /// 追加写入的动作日志
    #[serde(default = "default_action_log_path")]
    pub action_log_path: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            action_log_path: default_action_log_path(),
        }
    }
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_action_log_path() -> PathBuf {
    PathBuf::from("zoker_log.txt")
}

/// [self_image] 段：自身脚本路径与重写规则
#[derive(Debug, Clone, Deserialize)]
pub struct SelfImageSection {
    #[serde(default = "default_self_image_path")]
    pub path: PathBuf,
    /// 新版本的固定文件头
    #[serde(default = "default_header")]
    pub header: String,
    /// 覆盖前把旧版本复制到 `<path>.bak`
    #[serde(default = "default_true")]
    pub backup_before_write: bool,
}

impl Default for SelfImageSection {
    fn default() -> Self {
        Self {
            path: default_self_image_path(),
            header: default_header(),
            backup_before_write: true,
        }
    }
}

fn default_self_image_path() -> PathBuf {
    PathBuf::from("zoker.py")
}

fn default_header() -> String {
    "# AI-Generated Improvements\n\n".to_string()
}

fn default_true() -> bool {
    true
}

/// [scrape] 段：抓取地址、单页截断、请求间隔与超时
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeSection {
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
    /// 每个地址最多保留的字符数
    #[serde(default = "default_max_chars_per_location")]
    pub max_chars_per_location: usize,
    /// 两次请求之间的最小间隔（毫秒）
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// learn 流程打印/记录的摘录长度
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            max_chars_per_location: default_max_chars_per_location(),
            min_interval_ms: default_min_interval_ms(),
            timeout_secs: default_timeout_secs(),
            excerpt_chars: default_excerpt_chars(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_locations() -> Vec<String> {
    vec![
        "https://realpython.com".into(),
        "https://towardsdatascience.com".into(),
        "https://www.geeksforgeeks.org/python-programming-language/".into(),
    ]
}

fn default_max_chars_per_location() -> usize {
    1000
}

fn default_min_interval_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_excerpt_chars() -> usize {
    500
}

fn default_user_agent() -> String {
    crate::tools::search::DEFAULT_USER_AGENT.to_string()
}

/// [publish] 段：远程仓库、本地工作副本、提交信息
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSection {
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// 提交者身份；两者都设置时覆盖 git 自身的 user.name / user.email
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            local_path: default_local_path(),
            remote: default_remote(),
            commit_message: default_commit_message(),
            author_name: None,
            author_email: None,
        }
    }
}

fn default_remote_url() -> String {
    "https://github.com/zokerai/Zoker".to_string()
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./zoker_repo")
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_commit_message() -> String {
    "Auto-update: Code improvements from web scraping".to_string()
}

/// [relaunch] 段：以 `<program> <args...> <entrypoint>` 启动新版本
#[derive(Debug, Clone, Deserialize)]
pub struct RelaunchSection {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RelaunchSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

fn default_program() -> String {
    "python3".to_string()
}

/// 从 config 目录加载配置，环境变量 ZOKER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ZOKER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ZOKER")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("scrape.locations")
            .with_list_parse_key("relaunch.args")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
