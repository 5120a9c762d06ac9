//! Transport layer for the analytics backend
//!
//! One method per backend capability, all returning the shared
//! [`ApiResponse`] envelope.

mod client;
mod types;

pub use client::{build_http_client, ApiClient};
pub use types::{
    ApiErrorDetail, ApiResponse, BasicStats, ClearCacheRequest, CrawlerStartResponse,
    CrawlerTask, DashboardData, DashboardQuery, QuestionsListData, QuestionsQuery,
    StartCrawlerRequest, SystemStatus, TagCount, TagsData, TagsQuery, TaskStatus, TrendPoint,
    TrendsData, TrendsQuery, UsersData, UsersQuery,
};
