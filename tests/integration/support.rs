//! Shared fixtures for the integration tests

use crawlboard::api::ApiClient;
use crawlboard::config::CrawlerConfig;
use crawlboard::poller::PollOptions;
use crawlboard::store::DataStore;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PREFIX: &str = "/api/v1";

/// Full path of an endpoint on the mock server
pub fn api_path(endpoint: &str) -> String {
    format!("{}{}", API_PREFIX, endpoint)
}

pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}{}", server.uri(), API_PREFIX)).expect("Failed to build client")
}

/// Creates a store against the mock server with a short poll interval
pub fn store_for(server: &MockServer, crawler: CrawlerConfig, max_attempts: u32) -> DataStore {
    DataStore::new(
        client_for(server),
        crawler,
        PollOptions {
            max_attempts,
            interval: Duration::from_millis(20),
        },
    )
}

pub fn default_store(server: &MockServer) -> DataStore {
    store_for(server, CrawlerConfig::default(), 120)
}

/// Wraps a payload in the backend's success envelope
pub fn envelope(data: Value) -> Value {
    json!({
        "code": 200,
        "message": "ok",
        "data": data,
        "timestamp": "2024-05-01T10:00:00"
    })
}

/// Backend error body
pub fn error_envelope(code: u16, message: &str) -> Value {
    json!({
        "code": code,
        "message": message,
        "error": {"type": "ServerError", "details": message}
    })
}

pub fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn dashboard_payload() -> Value {
    json!({
        "basic_stats": {
            "total_questions": 120,
            "total_views": 5400,
            "total_likes": 310,
            "total_answers": 260,
            "total_reputation": 9800,
            "total_users": 45,
            "avg_views": 45.5,
            "avg_likes": 2.75,
            "avg_answers": 2.25,
            "max_views": 900,
            "min_views": 3
        },
        "top_questions": [{"id": "q1", "title": "How do gears mesh?", "views": 900}],
        "top_users": [{"user": "alice", "question_count": 12}],
        "top_tags": [{"tag": "mechanics", "count": 30}]
    })
}

pub fn trends_payload() -> Value {
    json!({
        "granularity": "monthly",
        "data": [
            {"period": "2024-04", "question_count": 40, "total_views": 1800, "total_likes": 90, "total_answers": 70},
            {"period": "2024-05", "question_count": 80, "total_views": 3600, "total_likes": 220, "total_answers": 190}
        ]
    })
}

pub fn users_payload() -> Value {
    json!({
        "total_users": 45,
        "avg_questions_per_user": 2.5,
        "users": [{"rank": 1, "user": "alice", "question_count": 12}]
    })
}

pub fn tags_payload() -> Value {
    json!({
        "total_tags": 2,
        "tags": [{"tag": "mechanics", "count": 30}, {"tag": "casting", "count": 12}]
    })
}

pub fn questions_payload() -> Value {
    json!({
        "total": 120,
        "page": 1,
        "limit": 20,
        "pages": 6,
        "questions": [{"id": "q1", "title": "How do gears mesh?", "views": 900}]
    })
}

/// Mounts a successful handler for one analysis endpoint
pub async fn mount_analysis(server: &MockServer, endpoint: &str, payload: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(api_path(endpoint)))
        .respond_with(ok_json(envelope(payload)))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts successful handlers for all five analysis endpoints
pub async fn mount_all_analysis(server: &MockServer, expected: u64) {
    mount_analysis(server, "/analysis/dashboard", dashboard_payload(), expected).await;
    mount_analysis(server, "/analysis/trends", trends_payload(), expected).await;
    mount_analysis(server, "/analysis/users", users_payload(), expected).await;
    mount_analysis(server, "/analysis/tags", tags_payload(), expected).await;
    mount_analysis(server, "/analysis/questions", questions_payload(), expected).await;
}

/// Polls `condition` until it holds or two seconds pass
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
