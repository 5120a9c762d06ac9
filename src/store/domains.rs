//! Fetch operations for the five analysis domains
//!
//! Every domain goes through the same state machine:
//!
//! 1. `loading = true`, `error = None`
//! 2. call the backend
//! 3. success with data → replace `data`
//! 4. success without data, or any failure → store the most specific message
//! 5. `loading = false`, always
//!
//! Failures never leave this module as errors; they end up in the slice.

use crate::api::{ApiResponse, DashboardQuery, QuestionsQuery, TagsQuery, TrendsQuery, UsersQuery};
use crate::state::{Domain, DomainSlice};
use crate::store::DataStore;
use crate::Result;
use std::future::Future;
use tokio::sync::watch;

/// How a single domain fetch settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    /// The message that was stored in the slice
    Failed(String),
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// Resets `loading` if the fetch future is dropped before it settles
struct LoadingGuard<'a, T> {
    slice: &'a watch::Sender<DomainSlice<T>>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.slice.send_if_modified(|slice| {
            if slice.loading {
                slice.loading = false;
                true
            } else {
                false
            }
        });
    }
}

/// Runs one fetch against `slice`
async fn load_slice<T, F>(
    domain: Domain,
    slice: &watch::Sender<DomainSlice<T>>,
    request: F,
) -> FetchOutcome
where
    F: Future<Output = Result<ApiResponse<T>>>,
{
    slice.send_modify(DomainSlice::begin_fetch);
    let _guard = LoadingGuard { slice };

    match request.await.and_then(ApiResponse::into_data) {
        Ok(data) => {
            slice.send_modify(|s| s.finish_success(data));
            tracing::info!("{} data loaded", domain);
            FetchOutcome::Loaded
        }
        Err(e) => {
            let message = e.user_message(domain.fallback_message());
            tracing::error!("Failed to load {} data: {}", domain, message);
            slice.send_modify(|s| s.finish_failure(message.clone()));
            FetchOutcome::Failed(message)
        }
    }
}

impl DataStore {
    /// Loads the dashboard overview with default cache settings
    pub async fn fetch_dashboard(&self) -> FetchOutcome {
        self.fetch_dashboard_with(&DashboardQuery::default()).await
    }

    pub async fn fetch_dashboard_with(&self, query: &DashboardQuery) -> FetchOutcome {
        load_slice(
            Domain::Dashboard,
            &self.inner.dashboard,
            self.inner.client.get_dashboard(query),
        )
        .await
    }

    pub async fn fetch_trends(&self, query: &TrendsQuery) -> FetchOutcome {
        load_slice(
            Domain::Trends,
            &self.inner.trends,
            self.inner.client.get_trends(query),
        )
        .await
    }

    pub async fn fetch_users(&self, query: &UsersQuery) -> FetchOutcome {
        load_slice(
            Domain::Users,
            &self.inner.users,
            self.inner.client.get_users_analysis(query),
        )
        .await
    }

    pub async fn fetch_tags(&self, query: &TagsQuery) -> FetchOutcome {
        load_slice(
            Domain::Tags,
            &self.inner.tags,
            self.inner.client.get_tags_analysis(query),
        )
        .await
    }

    pub async fn fetch_questions(&self, query: &QuestionsQuery) -> FetchOutcome {
        load_slice(
            Domain::Questions,
            &self.inner.questions,
            self.inner.client.get_questions_list(query),
        )
        .await
    }

    /// Re-fetches every domain concurrently with default parameters
    ///
    /// Waits for all five fetches; a failing domain neither cancels nor
    /// delays the others.
    pub async fn refresh_all_data(&self) -> Vec<(Domain, FetchOutcome)> {
        tracing::info!("Refreshing all data...");

        let trends_query = TrendsQuery::default();
        let users_query = UsersQuery::default();
        let tags_query = TagsQuery::default();
        let questions_query = QuestionsQuery::default();

        let (dashboard, trends, users, tags, questions) = tokio::join!(
            self.fetch_dashboard(),
            self.fetch_trends(&trends_query),
            self.fetch_users(&users_query),
            self.fetch_tags(&tags_query),
            self.fetch_questions(&questions_query),
        );

        let outcomes = vec![
            (Domain::Dashboard, dashboard),
            (Domain::Trends, trends),
            (Domain::Users, users),
            (Domain::Tags, tags),
            (Domain::Questions, questions),
        ];

        let failed = outcomes.iter().filter(|(_, o)| !o.is_loaded()).count();
        tracing::info!(
            "Refresh finished: {} loaded, {} failed",
            outcomes.len() - failed,
            failed
        );

        outcomes
    }
}
