//! Wire types for the analytics backend
//!
//! Every endpoint answers with the same envelope; the payload types below are
//! what ends up in its `data` field. List items the dashboard renders without
//! interpreting (questions, users) stay as raw JSON values.

use crate::CrawlboardError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Response envelope shared by all backend endpoints
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorDetail>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Extracts the payload, treating a missing `data` field as a failure
    ///
    /// The envelope message travels with the error so callers can show what
    /// the server said.
    pub fn into_data(self) -> Result<T, CrawlboardError> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(CrawlboardError::EmptyData {
                message: Some(self.message).filter(|m| !m.trim().is_empty()),
            }),
        }
    }
}

/// Error detail attached to failed envelopes
///
/// The backend emits either a structured `{type, details}` object or a
/// bare string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        details: String,
    },
    Message(String),
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured { kind, details } => write!(f, "{}: {}", kind, details),
            Self::Message(message) => write!(f, "{}", message),
        }
    }
}

// ===== Crawler =====

/// Lifecycle status of a backend crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
    Stopped,
}

impl TaskStatus {
    /// Returns true once the job can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body of `POST /crawler/start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartCrawlerRequest {
    pub max_pages: u32,
    pub timeout: u32,
    #[serde(rename = "async")]
    pub async_mode: bool,
}

/// Payload of `POST /crawler/start`
///
/// In async mode the backend answers with a task handle. In sync mode it
/// finishes the crawl first and the payload is the crawl result itself,
/// which lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CrawlerStartResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub progress: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A crawl job as reported by `GET /crawler/task/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CrawlerTask {
    pub task_id: String,
    pub status: TaskStatus,

    /// Percentage, 0-100
    #[serde(default)]
    pub progress: u32,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub current_page: u32,

    #[serde(default)]
    pub total_pages: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ===== Analysis =====

/// Aggregate counters shown at the top of the dashboard
///
/// The backend sends `{}` before the first crawl, so every field defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BasicStats {
    pub total_questions: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_answers: u64,
    pub total_reputation: u64,
    pub total_users: u64,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_answers: f64,
    pub max_views: u64,
    pub min_views: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardData {
    pub basic_stats: BasicStats,
    pub top_questions: Vec<Value>,
    pub top_users: Vec<Value>,
    pub top_tags: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrendPoint {
    pub period: String,
    pub question_count: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_answers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrendsData {
    pub granularity: String,
    pub data: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UsersData {
    pub total_users: u64,
    pub avg_questions_per_user: f64,
    pub users: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TagsData {
    pub total_tags: u64,
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuestionsListData {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
    pub questions: Vec<Value>,
}

// ===== System =====

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemStatus {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub cache_enabled: bool,
    pub tasks_running: u32,
}

// ===== Query parameters =====

/// Query for `GET /analysis/dashboard`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardQuery {
    pub use_cache: bool,
    pub cache_ttl: u64,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_ttl: 3600,
        }
    }
}

/// Query for `GET /analysis/trends`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// `daily`, `weekly` or `monthly`
    pub granularity: String,
    pub use_cache: bool,
    pub cache_ttl: u64,
}

impl Default for TrendsQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            granularity: "monthly".to_string(),
            use_cache: true,
            cache_ttl: 7200,
        }
    }
}

/// Query for `GET /analysis/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsersQuery {
    pub limit: u32,
    pub sort_by: String,
    pub use_cache: bool,
    pub cache_ttl: u64,
}

impl Default for UsersQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            sort_by: "question_count".to_string(),
            use_cache: true,
            cache_ttl: 3600,
        }
    }
}

/// Query for `GET /analysis/tags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagsQuery {
    pub limit: u32,
    pub use_cache: bool,
    pub cache_ttl: u64,
}

impl Default for TagsQuery {
    fn default() -> Self {
        Self {
            limit: 15,
            use_cache: true,
            cache_ttl: 7200,
        }
    }
}

/// Query for `GET /analysis/questions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionsQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
    /// `asc` or `desc`
    pub order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for QuestionsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            sort_by: "views".to_string(),
            order: "desc".to_string(),
            search: None,
        }
    }
}

/// Body of `POST /system/cache-clear`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearCacheRequest<'a> {
    pub cache_keys: &'a [String],
}
