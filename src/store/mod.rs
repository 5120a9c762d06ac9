//! Application state container
//!
//! `DataStore` owns every slice of dashboard state and is the only place
//! that mutates it. Observers get read-only views: a snapshot clone or a
//! `watch::Receiver` that is notified on every change.
//!
//! The store is cheap to clone; clones share the same state, so a stop
//! request can be issued from one task while another is still driving the
//! crawl.

mod crawl;
mod domains;

pub use domains::FetchOutcome;

use crate::api::{
    ApiClient, DashboardData, QuestionsListData, TagsData, TrendsData, UsersData,
};
use crate::config::{
    validate, validate_crawler_config, Config, CrawlerConfig, CrawlerConfigUpdate,
};
use crate::poller::PollOptions;
use crate::state::{CrawlState, Domain, DomainSlice};
use crate::{ConfigError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared state container for the dashboard
#[derive(Debug, Clone)]
pub struct DataStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    client: ApiClient,
    poll_options: PollOptions,
    crawler_config: watch::Sender<CrawlerConfig>,
    dashboard: watch::Sender<DomainSlice<DashboardData>>,
    trends: watch::Sender<DomainSlice<TrendsData>>,
    users: watch::Sender<DomainSlice<UsersData>>,
    tags: watch::Sender<DomainSlice<TagsData>>,
    questions: watch::Sender<DomainSlice<QuestionsListData>>,
    crawl: watch::Sender<CrawlState>,
}

/// Creates a state cell; the initial receiver is dropped, observers subscribe later
fn cell<T>(initial: T) -> watch::Sender<T> {
    watch::channel(initial).0
}

impl DataStore {
    /// Creates a store around an existing client
    ///
    /// # Arguments
    ///
    /// * `client` - Transport used for every backend call
    /// * `crawler_config` - Parameters for the next crawl start
    /// * `poll_options` - Bounds for polling started crawl jobs
    pub fn new(client: ApiClient, crawler_config: CrawlerConfig, poll_options: PollOptions) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                client,
                poll_options,
                crawler_config: cell(crawler_config),
                dashboard: cell(DomainSlice::new()),
                trends: cell(DomainSlice::new()),
                users: cell(DomainSlice::new()),
                tags: cell(DomainSlice::new()),
                questions: cell(DomainSlice::new()),
                crawl: cell(CrawlState::new()),
            }),
        }
    }

    /// Builds the client and the store from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;
        let client = ApiClient::from_config(&config.api)?;
        Ok(Self::new(
            client,
            config.crawler,
            PollOptions::from(&config.poll),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Redirects every later fetch and crawl call to another backend
    pub fn set_base_url(&self, base_url: &str) -> std::result::Result<(), ConfigError> {
        self.inner.client.set_base_url(base_url)
    }

    pub fn poll_options(&self) -> PollOptions {
        self.inner.poll_options
    }

    // ===== Crawler configuration =====

    pub fn crawler_config(&self) -> CrawlerConfig {
        *self.inner.crawler_config.borrow()
    }

    /// Merges `update` into the crawler configuration
    ///
    /// The configuration is left untouched when the merged result is invalid.
    pub fn set_crawler_config(
        &self,
        update: CrawlerConfigUpdate,
    ) -> std::result::Result<CrawlerConfig, ConfigError> {
        let merged = self.crawler_config().merged(&update);
        validate_crawler_config(&merged)?;
        self.inner.crawler_config.send_replace(merged);
        tracing::info!(
            "Crawler config updated: max_pages={}, timeout={}s, async={}",
            merged.max_pages,
            merged.timeout,
            merged.async_mode
        );
        Ok(merged)
    }

    // ===== Observer views =====

    pub fn dashboard_snapshot(&self) -> DomainSlice<DashboardData> {
        self.inner.dashboard.borrow().clone()
    }

    pub fn trends_snapshot(&self) -> DomainSlice<TrendsData> {
        self.inner.trends.borrow().clone()
    }

    pub fn users_snapshot(&self) -> DomainSlice<UsersData> {
        self.inner.users.borrow().clone()
    }

    pub fn tags_snapshot(&self) -> DomainSlice<TagsData> {
        self.inner.tags.borrow().clone()
    }

    pub fn questions_snapshot(&self) -> DomainSlice<QuestionsListData> {
        self.inner.questions.borrow().clone()
    }

    pub fn crawl_snapshot(&self) -> CrawlState {
        self.inner.crawl.borrow().clone()
    }

    pub fn subscribe_dashboard(&self) -> watch::Receiver<DomainSlice<DashboardData>> {
        self.inner.dashboard.subscribe()
    }

    pub fn subscribe_trends(&self) -> watch::Receiver<DomainSlice<TrendsData>> {
        self.inner.trends.subscribe()
    }

    pub fn subscribe_users(&self) -> watch::Receiver<DomainSlice<UsersData>> {
        self.inner.users.subscribe()
    }

    pub fn subscribe_tags(&self) -> watch::Receiver<DomainSlice<TagsData>> {
        self.inner.tags.subscribe()
    }

    pub fn subscribe_questions(&self) -> watch::Receiver<DomainSlice<QuestionsListData>> {
        self.inner.questions.subscribe()
    }

    pub fn subscribe_crawl(&self) -> watch::Receiver<CrawlState> {
        self.inner.crawl.subscribe()
    }

    // ===== Derived views =====

    /// Loading flag of every domain, in display order
    pub fn loading_flags(&self) -> Vec<(Domain, bool)> {
        Domain::all()
            .into_iter()
            .map(|domain| (domain, self.slice_status(domain).0))
            .collect()
    }

    /// Error of every domain, in display order
    pub fn domain_errors(&self) -> Vec<(Domain, Option<String>)> {
        Domain::all()
            .into_iter()
            .map(|domain| (domain, self.slice_status(domain).1))
            .collect()
    }

    /// Loading flag and error of one domain's slice
    fn slice_status(&self, domain: Domain) -> (bool, Option<String>) {
        fn status<T>(slice: &watch::Sender<DomainSlice<T>>) -> (bool, Option<String>) {
            let slice = slice.borrow();
            (slice.loading, slice.error.clone())
        }

        match domain {
            Domain::Dashboard => status(&self.inner.dashboard),
            Domain::Trends => status(&self.inner.trends),
            Domain::Users => status(&self.inner.users),
            Domain::Tags => status(&self.inner.tags),
            Domain::Questions => status(&self.inner.questions),
        }
    }

    /// Returns true if any domain fetch or the crawler start is in flight
    pub fn is_loading(&self) -> bool {
        self.loading_flags().iter().any(|(_, loading)| *loading)
            || self.inner.crawl.borrow().loading
    }

    /// Returns true if any domain or the crawler holds an error
    pub fn has_errors(&self) -> bool {
        !self.all_errors().is_empty()
    }

    pub fn has_dashboard_data(&self) -> bool {
        self.inner.dashboard.borrow().has_data()
    }

    /// Every current error as `"<domain>: <message>"`
    pub fn all_errors(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .domain_errors()
            .into_iter()
            .filter_map(|(domain, error)| error.map(|message| format!("{}: {}", domain, message)))
            .collect();

        if let Some(message) = &self.inner.crawl.borrow().error {
            errors.push(format!("crawler: {}", message));
        }

        errors
    }

    // ===== Bulk resets =====

    /// Drops the data of every domain; loading flags and errors are kept
    pub fn clear_all_data(&self) {
        self.inner.dashboard.send_modify(DomainSlice::clear_data);
        self.inner.trends.send_modify(DomainSlice::clear_data);
        self.inner.users.send_modify(DomainSlice::clear_data);
        self.inner.tags.send_modify(DomainSlice::clear_data);
        self.inner.questions.send_modify(DomainSlice::clear_data);
        tracing::debug!("All domain data cleared");
    }

    /// Clears the error of every domain and of the crawler
    pub fn clear_all_errors(&self) {
        self.inner.dashboard.send_modify(DomainSlice::clear_error);
        self.inner.trends.send_modify(DomainSlice::clear_error);
        self.inner.users.send_modify(DomainSlice::clear_error);
        self.inner.tags.send_modify(DomainSlice::clear_error);
        self.inner.questions.send_modify(DomainSlice::clear_error);
        self.inner.crawl.send_modify(CrawlState::clear_error);
        tracing::debug!("All errors cleared");
    }
}
