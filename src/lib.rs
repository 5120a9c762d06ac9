//! Crawlboard: data-access and state coordination for the Q&A analytics dashboard
//!
//! This crate talks to the analytics backend, drives crawl jobs to completion
//! by polling, and keeps the dashboard's independent data domains (dashboard,
//! trends, users, tags, questions) consistent with per-domain loading and
//! error tracking.

pub mod api;
pub mod config;
pub mod poller;
pub mod state;
pub mod store;

use thiserror::Error;

/// Main error type for Crawlboard operations
#[derive(Debug, Error)]
pub enum CrawlboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Http {
        status: u16,
        url: String,
        /// `message` field of the error envelope, when the body carried one
        server_message: Option<String>,
        body: String,
    },

    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Response contained no data")]
    EmptyData { message: Option<String> },

    #[error("Task {task_id} did not reach a terminal state after {attempts} polls")]
    PollTimeout { task_id: String, attempts: u32 },

    #[error("Crawler failed: {error}")]
    JobFailed { error: String },
}

impl CrawlboardError {
    /// Picks the most specific message available for display
    ///
    /// Server-provided messages win over transport messages; `fallback` is
    /// used only when neither carries any text.
    pub fn user_message(&self, fallback: &str) -> String {
        let specific = match self {
            Self::Http {
                server_message: Some(message),
                ..
            } if !message.trim().is_empty() => return message.clone(),
            Self::EmptyData { message } => message.clone().unwrap_or_default(),
            other => other.to_string(),
        };

        if specific.trim().is_empty() {
            fallback.to_string()
        } else {
            specific
        }
    }

    /// Returns true if the request never produced a response
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Crawlboard operations
pub type Result<T> = std::result::Result<T, CrawlboardError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{ApiClient, ApiResponse, CrawlerTask, TaskStatus};
pub use config::Config;
pub use poller::{poll_task_status, PollOptions, ProgressEvent};
pub use state::{CrawlPhase, CrawlState, DomainSlice};
pub use store::DataStore;
