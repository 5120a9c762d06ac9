//! Crawl lifecycle state owned by the orchestration slice

use crate::poller::ProgressEvent;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// Message shown while the start request is in flight
pub const STARTING_MESSAGE: &str = "Preparing crawler...";

/// Where the crawl orchestration currently is
///
/// `Idle -> Starting -> Polling -> {Completed | Failed | Stopped}`; a new
/// start leaves any terminal phase again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    #[default]
    Idle,
    Starting,
    Polling,
    Completed,
    Failed,
    Stopped,
}

impl CrawlPhase {
    /// Returns true while a start or poll is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Polling)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable state of the crawl orchestration slice
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrawlState {
    pub is_running: bool,

    /// Job being driven; at most one at a time
    pub current_task_id: Option<String>,

    /// Percentage reported by the last observation
    pub progress: u32,

    pub message: String,

    /// Result of the last completed crawl, kept until the next one completes
    pub last_result: Option<Value>,

    pub phase: CrawlPhase,

    /// True while `start_crawler` has not returned
    pub loading: bool,

    pub error: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `task_id` is the job this state is tracking
    pub fn owns(&self, task_id: &str) -> bool {
        self.current_task_id.as_deref() == Some(task_id)
    }

    /// Resets progress for a new start request
    pub fn begin_start(&mut self) {
        self.is_running = true;
        self.loading = true;
        self.progress = 0;
        self.message = STARTING_MESSAGE.to_string();
        self.error = None;
        self.phase = CrawlPhase::Starting;
        self.touch();
    }

    /// Records the job handle returned by the backend
    pub fn task_accepted(&mut self, task_id: &str, message: Option<&str>) {
        self.current_task_id = Some(task_id.to_string());
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self.touch();
    }

    pub fn begin_polling(&mut self) {
        self.phase = CrawlPhase::Polling;
        self.touch();
    }

    /// Applies an observation of the tracked job
    ///
    /// Observations of any other job are ignored; returns whether the state
    /// changed.
    pub fn apply_progress(&mut self, event: &ProgressEvent) -> bool {
        if !self.owns(&event.task_id) {
            return false;
        }
        self.progress = event.progress;
        self.message = event.message.clone();
        self.touch();
        true
    }

    pub fn complete(&mut self, result: Option<Value>) {
        self.last_result = result;
        self.phase = CrawlPhase::Completed;
        self.touch();
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.phase = CrawlPhase::Failed;
        self.touch();
    }

    /// Failure before any job was accepted
    pub fn abort_start(&mut self, message: String) {
        self.fail(message);
        self.is_running = false;
    }

    pub fn mark_stopped(&mut self) {
        self.is_running = false;
        self.phase = CrawlPhase::Stopped;
        self.touch();
    }

    /// Ends the run for `task_id` and forgets the handle
    pub fn settle(&mut self, task_id: &str) -> bool {
        if !self.owns(task_id) {
            return false;
        }
        self.is_running = false;
        self.current_task_id = None;
        self.touch();
        true
    }

    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
