//! Status source abstraction for the poll loop

use crate::api::{ApiClient, ApiResponse, CrawlerTask};
use crate::Result;
use std::future::Future;

/// Anything that can report the current state of a crawl job
///
/// [`ApiClient`] is the production implementation; tests substitute
/// scripted sources to drive the poll loop without HTTP.
pub trait TaskStatusSource {
    /// Performs exactly one status query for `task_id`
    fn fetch_task_status(
        &self,
        task_id: &str,
    ) -> impl Future<Output = Result<ApiResponse<CrawlerTask>>> + Send;
}

impl TaskStatusSource for ApiClient {
    async fn fetch_task_status(&self, task_id: &str) -> Result<ApiResponse<CrawlerTask>> {
        self.get_crawler_task(task_id).await
    }
}
