//! Bounded polling of backend crawl jobs
//!
//! The backend has no push channel, so a running job is observed by querying
//! its status at a fixed interval until it reaches a terminal state or the
//! attempt budget runs out. Each observation is published as a
//! [`ProgressEvent`] on an optional channel.

mod source;

pub use source::TaskStatusSource;

use crate::api::{CrawlerTask, TaskStatus};
use crate::config::PollConfig;
use crate::{CrawlboardError, Result};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Bounds for one poll run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Maximum number of status queries
    pub max_attempts: u32,

    /// Delay between two queries
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollOptions {
    fn from(config: &PollConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: Duration::from_millis(config.interval_ms),
        }
    }
}

/// One observed job state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub task_id: String,
    /// 1-based index of the query that produced this observation
    pub attempt: u32,
    pub status: TaskStatus,
    pub progress: u32,
    pub message: String,
}

/// Polls a crawl job until it finishes
///
/// # Loop
///
/// 1. Query the job status once
/// 2. If the envelope carries a job, publish a `ProgressEvent` and return
///    the job as soon as its status is terminal (no further query or sleep)
/// 3. Otherwise sleep `interval` and try again, up to `max_attempts` queries
///
/// # Errors
///
/// * Any failed query is returned immediately; the query is not retried.
/// * `PollTimeout` when every attempt observed a non-terminal job.
///
/// A closed progress channel is ignored.
pub async fn poll_task_status<S: TaskStatusSource>(
    source: &S,
    task_id: &str,
    options: &PollOptions,
    progress: Option<&UnboundedSender<ProgressEvent>>,
) -> Result<CrawlerTask> {
    tracing::debug!(
        "Polling task {} (max {} attempts, every {:?})",
        task_id,
        options.max_attempts,
        options.interval
    );

    for attempt in 1..=options.max_attempts {
        let response = source.fetch_task_status(task_id).await.map_err(|e| {
            tracing::error!("Polling task {} failed on attempt {}: {}", task_id, attempt, e);
            e
        })?;

        if let Some(task) = response.data {
            tracing::debug!(
                "Task {} is {} ({}%): {}",
                task_id,
                task.status,
                task.progress,
                task.message
            );

            if let Some(sender) = progress {
                let _ = sender.send(ProgressEvent {
                    task_id: task_id.to_string(),
                    attempt,
                    status: task.status,
                    progress: task.progress,
                    message: task.message.clone(),
                });
            }

            if task.status.is_terminal() {
                return Ok(task);
            }
        } else {
            tracing::warn!("Status query for task {} returned no data", task_id);
        }

        if attempt < options.max_attempts {
            tokio::time::sleep(options.interval).await;
        }
    }

    tracing::warn!(
        "Task {} still running after {} polls, giving up",
        task_id,
        options.max_attempts
    );
    Err(CrawlboardError::PollTimeout {
        task_id: task_id.to_string(),
        attempts: options.max_attempts,
    })
}
