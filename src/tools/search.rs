//! 内容抓取：按顺序抓取一组地址，拼接每页截断后的可读文本
//!
//! GET 请求带浏览器 UA 与常用请求头、带超时；只接受 2xx 响应。
//! 对 HTML 响应使用 html2text 提取可读文本，去除标签与脚本。
//! 单个地址失败只记录，不影响后续地址；相邻请求之间由 MinIntervalGate 控制间隔。

use std::sync::Arc;

use async_trait::async_trait;
use html2text::from_read;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, UPGRADE_INSECURE_REQUESTS};
use reqwest::Client;

use crate::core::ZokerError;
use crate::tools::MinIntervalGate;

/// 单页抓取：返回该地址的可读文本
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, location: &str) -> Result<String, ZokerError>;
}

/// 简易去除 HTML 标签（html2text 失败时的回退）
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 判断内容是否像 HTML（需提取可读文本）
fn looks_like_html(s: &str) -> bool {
    let s = s.trim_start();
    s.starts_with("<!")
        || s.starts_with("<html")
        || s.starts_with("<HTML")
        || (s.len() > 20
            && s.contains('<')
            && (s.contains("</") || s.contains("<meta") || s.contains("<head") || s.contains("<title")))
}

/// 将 HTML 转为可读文本（去除 script/style 等）
fn html_to_text(html: &str) -> String {
    match from_read(html.as_bytes(), 120) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => strip_html_tags(html),
    }
}

/// 截取前 max_chars 个字符
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 浏览器 UA；配置的 UA 不是合法请求头时回退到它
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// 基于 reqwest 的网页抓取
pub struct WebFetcher {
    client: Client,
}

impl WebFetcher {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        let build = |ua: &str| {
            Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .user_agent(ua)
                .default_headers(headers.clone())
                .build()
        };
        let client = build(user_agent)
            .or_else(|e| {
                tracing::warn!(user_agent, error = %e, "invalid user agent, using default");
                build(DEFAULT_USER_AGENT)
            })
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "http client build failed, using reqwest defaults");
                Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for WebFetcher {
    async fn fetch_page(&self, location: &str) -> Result<String, ZokerError> {
        let failed = |reason: String| ZokerError::FetchFailed {
            location: location.to_string(),
            reason,
        };
        let resp = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| failed(format!("Request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(ZokerError::FetchStatus {
                location: location.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let body = resp
            .text()
            .await
            .map_err(|e| failed(format!("Read body: {}", e)))?;

        // 去除 BOM，避免 HTML 检测失败
        let body = body.strip_prefix('\u{FEFF}').unwrap_or(body.as_str());

        Ok(if looks_like_html(body) {
            html_to_text(body)
        } else {
            body.to_string()
        })
    }
}

/// 一次抓取的结果：成功部分按地址顺序拼接，失败部分逐条保留
#[derive(Debug, Default)]
pub struct ScrapedContent {
    pub text: String,
    pub succeeded: usize,
    pub failures: Vec<ZokerError>,
}

impl ScrapedContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// 内容来源：串行抓取、单页截断、失败跳过
pub struct ContentSource {
    fetcher: Arc<dyn PageFetcher>,
    gate: MinIntervalGate,
    max_chars_per_location: usize,
}

impl ContentSource {
    pub fn new(fetcher: Arc<dyn PageFetcher>, gate: MinIntervalGate, max_chars_per_location: usize) -> Self {
        Self {
            fetcher,
            gate,
            max_chars_per_location,
        }
    }

    pub async fn fetch(&self, locations: &[String]) -> ScrapedContent {
        let mut content = ScrapedContent::default();
        for location in locations {
            self.gate.wait().await;
            tracing::info!(location = %location, "fetching");
            match self.fetcher.fetch_page(location).await {
                Ok(text) => {
                    content
                        .text
                        .push_str(truncate_chars(&text, self.max_chars_per_location));
                    content.succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(location = %location, error = %e, "fetch failed, skipping");
                    content.failures.push(e);
                }
            }
        }
        content
    }
}
