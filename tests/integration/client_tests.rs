use crate::support::*;
use crawlboard::api::{
    ApiClient, DashboardQuery, StartCrawlerRequest, TaskStatus, TrendsQuery,
};
use crawlboard::CrawlboardError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_start_crawler_sends_config_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/crawler/start")))
        .and(body_json(json!({"max_pages": 10, "timeout": 30, "async": true})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "code": 202,
            "message": "Crawler task submitted",
            "data": {
                "task_id": "crawler_task_0123456789ab",
                "status": "running",
                "progress": 0,
                "message": "Initializing crawler..."
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .start_crawler(&StartCrawlerRequest {
            max_pages: 10,
            timeout: 30,
            async_mode: true,
        })
        .await
        .expect("Start request failed");

    assert_eq!(response.code, 202);
    let started = response.into_data().expect("Missing start payload");
    assert_eq!(started.task_id.as_deref(), Some("crawler_task_0123456789ab"));
    assert_eq!(started.status, Some(TaskStatus::Running));
}

#[tokio::test]
async fn test_get_crawler_task() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/crawler/task/t1")))
        .respond_with(ok_json(envelope(json!({
            "task_id": "t1",
            "status": "completed",
            "progress": 100,
            "message": "done",
            "current_page": 10,
            "total_pages": 10,
            "result": {"count": 42}
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let task = client_for(&mock_server)
        .get_crawler_task("t1")
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.current_page, 10);
    assert_eq!(task.result, Some(json!({"count": 42})));
}

#[tokio::test]
async fn test_dashboard_sends_cache_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/analysis/dashboard")))
        .and(query_param("use_cache", "false"))
        .and(query_param("cache_ttl", "60"))
        .respond_with(ok_json(envelope(dashboard_payload())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .get_dashboard(&DashboardQuery {
            use_cache: false,
            cache_ttl: 60,
        })
        .await
        .unwrap();

    assert_eq!(response.into_data().unwrap().basic_stats.total_questions, 120);
}

#[tokio::test]
async fn test_trends_omits_missing_dates() {
    let mock_server = MockServer::start().await;
    mount_analysis(&mock_server, "/analysis/trends", trends_payload(), 1).await;

    client_for(&mock_server)
        .get_trends(&TrendsQuery::default())
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or("").to_string();
    assert!(query.contains("granularity=monthly"), "query was {}", query);
    assert!(query.contains("cache_ttl=7200"), "query was {}", query);
    assert!(!query.contains("start_date"), "query was {}", query);
    assert!(!query.contains("end_date"), "query was {}", query);
}

#[tokio::test]
async fn test_http_error_carries_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/analysis/users")))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(error_envelope(500, "User analysis failed")),
        )
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .get_users_analysis(&Default::default())
        .await;

    match result {
        Err(CrawlboardError::Http {
            status,
            server_message,
            ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(server_message.as_deref(), Some("User analysis failed"));
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_without_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/system/status")))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .get_system_status()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlboardError::Http {
            status: 502,
            server_message: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/system/status")))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .get_system_status()
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlboardError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = ApiClient::new("http://127.0.0.1:1/api/v1").unwrap();

    let err = client.get_system_status().await.unwrap_err();

    assert!(err.is_network(), "expected network error, got {:?}", err);
}

#[tokio::test]
async fn test_clear_cache_with_and_without_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/system/cache-clear")))
        .and(body_json(json!({"cache_keys": ["dashboard_data"]})))
        .respond_with(ok_json(envelope(json!({"cleared_count": 1}))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("/system/cache-clear")))
        .respond_with(ok_json(envelope(json!({"cleared_count": 0}))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let keys = vec!["dashboard_data".to_string()];

    let targeted = client.clear_cache(Some(&keys)).await.unwrap();
    assert_eq!(targeted.data, Some(json!({"cleared_count": 1})));

    let everything = client.clear_cache(None).await.unwrap();
    assert_eq!(everything.data, Some(json!({"cleared_count": 0})));
}

#[tokio::test]
async fn test_system_and_cache_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/system/status")))
        .respond_with(ok_json(envelope(json!({
            "status": "healthy",
            "version": "1.0.0",
            "timestamp": "2024-05-01T10:00:00",
            "cache_enabled": true,
            "tasks_running": 1
        }))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/system/cache-status")))
        .respond_with(ok_json(envelope(json!({"total_keys": 3}))))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let status = client.get_system_status().await.unwrap().into_data().unwrap();
    assert_eq!(status.status, "healthy");
    assert!(status.cache_enabled);
    assert_eq!(status.tasks_running, 1);

    let cache = client.get_cache_status().await.unwrap().into_data().unwrap();
    assert_eq!(cache["total_keys"], json!(3));
}

#[tokio::test]
async fn test_set_base_url_switches_backend() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/crawler/stop/t9")))
        .respond_with(ok_json(envelope(json!({"task_id": "t9", "status": "stopped"}))))
        .expect(0)
        .mount(&first)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("/crawler/stop/t9")))
        .respond_with(ok_json(envelope(json!({"task_id": "t9", "status": "stopped"}))))
        .expect(1)
        .mount(&second)
        .await;

    let client = client_for(&first);
    client
        .set_base_url(&format!("{}{}", second.uri(), API_PREFIX))
        .unwrap();

    client.stop_crawler_task("t9").await.unwrap();
}
