use serde::{Deserialize, Serialize};

/// Default backend address used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";

/// Main configuration structure for Crawlboard
///
/// Every section is optional; missing sections and keys fall back to the
/// defaults the dashboard ships with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub crawler: CrawlerConfig,
    pub poll: PollConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Parameters sent to the backend when a crawl job is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of listing pages the backend should crawl
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Backend-side crawl timeout (seconds)
    pub timeout: u32,

    /// Whether the backend answers immediately with a task id to poll
    #[serde(rename = "async-mode")]
    pub async_mode: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            timeout: 30,
            async_mode: true,
        }
    }
}

impl CrawlerConfig {
    /// Returns a copy with every field present in `update` replaced
    pub fn merged(&self, update: &CrawlerConfigUpdate) -> Self {
        Self {
            max_pages: update.max_pages.unwrap_or(self.max_pages),
            timeout: update.timeout.unwrap_or(self.timeout),
            async_mode: update.async_mode.unwrap_or(self.async_mode),
        }
    }
}

/// Partial update for [`CrawlerConfig`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlerConfigUpdate {
    pub max_pages: Option<u32>,
    pub timeout: Option<u32>,
    pub async_mode: Option<bool>,
}

/// Bounds for the task status polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    /// Maximum number of status queries before giving up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay between two status queries (milliseconds)
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval_ms: 2000,
        }
    }
}
