//! Crawl orchestration - start, poll and stop backend crawl jobs
//!
//! This module drives one crawl job at a time:
//! - Starting the job with the current crawler configuration
//! - Polling it to a terminal state while mirroring progress into the slice
//! - Refreshing every domain once the job completes
//! - Advisory stop requests that may race the poll loop
//!
//! State updates coming from a poll loop are only applied while the slice
//! still tracks that loop's task, so a stopped job's loop cannot overwrite
//! a newer run.

use crate::api::{ApiResponse, CrawlerStartResponse, StartCrawlerRequest, TaskStatus};
use crate::poller::{poll_task_status, ProgressEvent};
use crate::state::{CrawlPhase, CrawlState};
use crate::store::DataStore;
use crate::CrawlboardError;
use serde_json::Value;
use tokio::sync::mpsc;

const START_FAILED: &str = "Failed to start crawler";
const POLL_FAILED: &str = "Crawler polling failed";
const STOP_FAILED: &str = "Failed to stop crawler";
const UNKNOWN_JOB_ERROR: &str = "unknown error";

impl DataStore {
    /// Starts a crawl job and, in async mode, drives it to completion
    ///
    /// A start while another run is still marked running is ignored. Failures
    /// are recorded in the crawl slice; the returned phase is the one the
    /// slice ended in.
    pub async fn start_crawler(&self) -> CrawlPhase {
        let config = self.crawler_config();

        let accepted = self.inner.crawl.send_if_modified(|state| {
            if state.is_running || state.phase.is_active() {
                false
            } else {
                state.begin_start();
                true
            }
        });
        if !accepted {
            tracing::warn!(
                "Crawler already running (task {}), start ignored",
                self.crawl_snapshot()
                    .current_task_id
                    .as_deref()
                    .unwrap_or("pending")
            );
            return self.crawl_snapshot().phase;
        }

        tracing::info!(
            "Starting crawler: max_pages={}, timeout={}s, async={}",
            config.max_pages,
            config.timeout,
            config.async_mode
        );

        let request = StartCrawlerRequest {
            max_pages: config.max_pages,
            timeout: config.timeout,
            async_mode: config.async_mode,
        };

        match self.inner.client.start_crawler(&request).await {
            Ok(response) => self.handle_start_response(response, config.async_mode).await,
            Err(e) => self.abort_start(e.user_message(START_FAILED)),
        }

        self.inner.crawl.send_modify(CrawlState::finish_loading);
        self.crawl_snapshot().phase
    }

    async fn handle_start_response(
        &self,
        response: ApiResponse<CrawlerStartResponse>,
        async_mode: bool,
    ) {
        let envelope_message = response.message.clone();
        let started = match response.into_data() {
            Ok(started) => started,
            Err(e) => return self.abort_start(e.user_message(START_FAILED)),
        };

        if !async_mode {
            // The backend ran the whole crawl before answering.
            tracing::info!("Crawler finished synchronously");
            self.inner.crawl.send_modify(|state| {
                state.complete(Some(Value::Object(started.extra)));
                state.is_running = false;
            });
            self.refresh_all_data().await;
            return;
        }

        match started.task_id {
            Some(task_id) => {
                tracing::info!("Crawler task submitted, task id: {}", task_id);
                self.inner
                    .crawl
                    .send_modify(|state| state.task_accepted(&task_id, started.message.as_deref()));
                self.poll_crawler().await;
            }
            None => {
                let message = if envelope_message.trim().is_empty() {
                    START_FAILED.to_string()
                } else {
                    envelope_message
                };
                self.abort_start(message);
            }
        }
    }

    fn abort_start(&self, message: String) {
        tracing::error!("Failed to start crawler: {}", message);
        self.inner.crawl.send_modify(|state| state.abort_start(message));
    }

    /// Polls the current crawl job until it reaches a terminal state
    ///
    /// Without a current task this only logs. On completion every domain is
    /// refreshed; refresh failures stay in their own slices and do not change
    /// the crawl outcome.
    pub async fn poll_crawler(&self) {
        let Some(task_id) = self.crawl_snapshot().current_task_id else {
            tracing::error!("No crawler task to poll");
            return;
        };

        self.inner.crawl.send_modify(CrawlState::begin_polling);

        let (sender, mut receiver) = mpsc::unbounded_channel::<ProgressEvent>();
        let poll = async {
            let sender = sender;
            poll_task_status(
                &self.inner.client,
                &task_id,
                &self.inner.poll_options,
                Some(&sender),
            )
            .await
        };
        let forward = async {
            while let Some(event) = receiver.recv().await {
                tracing::info!("Crawler progress: {}% - {}", event.progress, event.message);
                self.inner
                    .crawl
                    .send_if_modified(|state| state.apply_progress(&event));
            }
        };
        let (result, ()) = tokio::join!(poll, forward);

        match result {
            Ok(task) => match task.status {
                TaskStatus::Completed => {
                    // Run is over here; a stop during the refresh is a no-op.
                    let owned = self.inner.crawl.send_if_modified(|state| {
                        if !state.owns(&task_id) {
                            return false;
                        }
                        state.complete(task.result.clone());
                        state.settle(&task_id);
                        true
                    });
                    if owned {
                        tracing::info!("Crawler task {} completed", task_id);
                        self.refresh_all_data().await;
                    }
                }
                TaskStatus::Failed => {
                    let error = CrawlboardError::JobFailed {
                        error: task
                            .error
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_JOB_ERROR.to_string()),
                    };
                    tracing::error!("Crawler task {} failed: {}", task_id, error);
                    self.record_for_task(&task_id, |state| state.fail(error.to_string()));
                }
                TaskStatus::Stopped => {
                    tracing::info!("Crawler task {} stopped", task_id);
                    self.record_for_task(&task_id, CrawlState::mark_stopped);
                }
                // poll_task_status only returns terminal jobs
                TaskStatus::Running => {}
            },
            Err(e) => {
                let message = e.user_message(POLL_FAILED);
                tracing::error!("Crawler polling failed: {}", message);
                self.record_for_task(&task_id, |state| state.fail(message));
            }
        }

        self.inner
            .crawl
            .send_if_modified(|state| state.settle(&task_id));
    }

    /// Asks the backend to stop the current crawl job
    ///
    /// Without a current task this only logs: no request is sent and no
    /// error is recorded. A successful stop marks the run as not running
    /// right away; the poll loop notices the stop on its next query.
    pub async fn stop_crawler(&self) {
        let Some(task_id) = self.crawl_snapshot().current_task_id else {
            tracing::error!("No running crawler task to stop");
            return;
        };

        match self.inner.client.stop_crawler_task(&task_id).await {
            Ok(_) => {
                tracing::info!("Crawler task {} stopped", task_id);
                self.record_for_task(&task_id, |state| {
                    state.mark_stopped();
                    state.settle(&task_id);
                });
            }
            Err(e) => {
                let message = e.user_message(STOP_FAILED);
                tracing::error!("Failed to stop crawler task {}: {}", task_id, message);
                self.inner.crawl.send_modify(|state| state.error = Some(message));
            }
        }
    }

    /// Applies `update` only while the slice still tracks `task_id`
    fn record_for_task<F>(&self, task_id: &str, update: F)
    where
        F: FnOnce(&mut CrawlState),
    {
        self.inner.crawl.send_if_modified(|state| {
            if !state.owns(task_id) {
                return false;
            }
            update(state);
            true
        });
    }
}
