//! HTTP client for the analytics backend
//!
//! This module handles all HTTP traffic to the backend, including:
//! - Building the HTTP client with JSON defaults and timeouts
//! - Resolving endpoint paths against a runtime-configurable base URL
//! - Uniform request/response logging
//! - Error classification (network, HTTP status, undecodable body)
//!
//! No retries happen here; callers such as the task poller decide whether
//! and how to repeat a request.

use crate::api::types::{
    ApiResponse, ClearCacheRequest, CrawlerStartResponse, CrawlerTask, DashboardData,
    DashboardQuery, QuestionsListData, QuestionsQuery, StartCrawlerRequest, SystemStatus,
    TagsData, TagsQuery, TrendsData, TrendsQuery, UsersData, UsersQuery,
};
use crate::config::{validate_base_url, ApiConfig};
use crate::{ConfigError, CrawlboardError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Builds an HTTP client with JSON defaults
///
/// # Arguments
///
/// * `config` - The backend connection configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(concat!("crawlboard/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for every backend endpoint the dashboard uses
///
/// Clones share the base URL, so [`ApiClient::set_base_url`] redirects every
/// holder of the client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<watch::Sender<Url>>,
}

impl ApiClient {
    /// Creates a client for `base_url` with default connection settings
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    /// Creates a client from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let base_url = validate_base_url(&config.base_url)?;
        let client = build_http_client(config).map_err(|e| {
            ConfigError::Validation(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: Arc::new(watch::channel(base_url).0),
        })
    }

    /// Points the client at a different backend
    ///
    /// The current base URL is kept when `base_url` is invalid.
    pub fn set_base_url(&self, base_url: &str) -> std::result::Result<(), ConfigError> {
        let url = validate_base_url(base_url)?;
        tracing::info!("API base URL set to {}", url);
        self.base_url.send_replace(url);
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.base_url.borrow().to_string()
    }

    // ===== Crawler =====

    /// Asks the backend to start a crawl job
    pub async fn start_crawler(
        &self,
        request: &StartCrawlerRequest,
    ) -> Result<ApiResponse<CrawlerStartResponse>> {
        let url = self.endpoint(&["crawler", "start"])?;
        self.execute(self.client.post(url).json(request)).await
    }

    /// Fetches the current state of a crawl job
    pub async fn get_crawler_task(&self, task_id: &str) -> Result<ApiResponse<CrawlerTask>> {
        let url = self.endpoint(&["crawler", "task", task_id])?;
        self.execute(self.client.get(url)).await
    }

    /// Asks the backend to stop a crawl job
    pub async fn stop_crawler_task(&self, task_id: &str) -> Result<ApiResponse<Value>> {
        let url = self.endpoint(&["crawler", "stop", task_id])?;
        self.execute(self.client.post(url)).await
    }

    // ===== Analysis =====

    pub async fn get_dashboard(&self, query: &DashboardQuery) -> Result<ApiResponse<DashboardData>> {
        let url = self.endpoint(&["analysis", "dashboard"])?;
        self.execute(self.client.get(url).query(query)).await
    }

    pub async fn get_trends(&self, query: &TrendsQuery) -> Result<ApiResponse<TrendsData>> {
        let url = self.endpoint(&["analysis", "trends"])?;
        self.execute(self.client.get(url).query(query)).await
    }

    pub async fn get_users_analysis(&self, query: &UsersQuery) -> Result<ApiResponse<UsersData>> {
        let url = self.endpoint(&["analysis", "users"])?;
        self.execute(self.client.get(url).query(query)).await
    }

    pub async fn get_tags_analysis(&self, query: &TagsQuery) -> Result<ApiResponse<TagsData>> {
        let url = self.endpoint(&["analysis", "tags"])?;
        self.execute(self.client.get(url).query(query)).await
    }

    pub async fn get_questions_list(
        &self,
        query: &QuestionsQuery,
    ) -> Result<ApiResponse<QuestionsListData>> {
        let url = self.endpoint(&["analysis", "questions"])?;
        self.execute(self.client.get(url).query(query)).await
    }

    // ===== System =====

    pub async fn get_system_status(&self) -> Result<ApiResponse<SystemStatus>> {
        let url = self.endpoint(&["system", "status"])?;
        self.execute(self.client.get(url)).await
    }

    pub async fn get_cache_status(&self) -> Result<ApiResponse<Value>> {
        let url = self.endpoint(&["system", "cache-status"])?;
        self.execute(self.client.get(url)).await
    }

    /// Clears the backend cache, either entirely or only the given keys
    pub async fn clear_cache(&self, cache_keys: Option<&[String]>) -> Result<ApiResponse<Value>> {
        let url = self.endpoint(&["system", "cache-clear"])?;
        let request = match cache_keys {
            Some(cache_keys) => self.client.post(url).json(&ClearCacheRequest { cache_keys }),
            None => self.client.post(url),
        };
        self.execute(request).await
    }

    /// Resolves path segments below the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.borrow().clone();
        {
            let base = url.to_string();
            let mut path = url.path_segments_mut().map_err(|_| {
                ConfigError::InvalidUrl(format!("base_url '{}' cannot take a path", base))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Sends a request and decodes the response envelope
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Request cannot be built | `Config` |
    /// | No response (connect, timeout, body read) | `Network` |
    /// | Non-2xx status | `Http` with the envelope message if present |
    /// | 2xx with a body that is not an envelope | `Decode` |
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<ApiResponse<T>> {
        let request = builder.build().map_err(|e| {
            tracing::error!("[api request error] {}", e);
            ConfigError::Validation(format!("Malformed request: {}", e))
        })?;
        let method = request.method().clone();
        let url = request.url().to_string();

        tracing::debug!("[api request] {} {}", method, url);

        let response = self.client.execute(request).await.map_err(|source| {
            tracing::error!("[api request error] {} {}: no response: {}", method, url, source);
            CrawlboardError::Network {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| CrawlboardError::Network {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            let server_message = serde_json::from_str::<ApiResponse<Value>>(&body)
                .ok()
                .map(|envelope| envelope.message)
                .filter(|message| !message.trim().is_empty());
            tracing::error!(
                "[api response error] {} {}: {}",
                status.as_u16(),
                url,
                server_message.as_deref().unwrap_or("unknown error")
            );
            return Err(CrawlboardError::Http {
                status: status.as_u16(),
                url,
                server_message,
                body,
            });
        }

        tracing::debug!("[api response] {} {}", status.as_u16(), url);
        tracing::trace!("[api response body] {}", body);

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("[api response error] {}: undecodable body: {}", url, e);
            CrawlboardError::Decode {
                url,
                message: e.to_string(),
            }
        })
    }
}
