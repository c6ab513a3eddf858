use runlens_contracts::ExecutionId;
use runlens_core::error::TimelineError;
use runlens_core::traits::{HistoryFetcher, WorkflowSearcher};
use runlens_temporal::{TemporalClient, TemporalConfig};
use serde_json::json;
use wiremock::matchers::{bearer_token, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HISTORY_PATH: &str = "/api/v1/namespaces/default/workflows/order-42/history";

fn client_for(server: &MockServer) -> TemporalClient {
    TemporalClient::new(TemporalConfig::new("test-key", server.uri(), Some(5)))
        .expect("client build")
}

fn execution() -> ExecutionId {
    ExecutionId {
        namespace: "default".to_string(),
        workflow_id: "order-42".to_string(),
        run_id: Some("run-1".to_string()),
    }
}

fn history_page(event_ids: &[i64], next_page_token: Option<&str>) -> serde_json::Value {
    let events: Vec<serde_json::Value> = event_ids
        .iter()
        .map(|id| {
            json!({
                "eventId": id.to_string(),
                "eventTime": "2024-05-03T10:00:00Z",
                "eventType": "EVENT_TYPE_TIMER_STARTED"
            })
        })
        .collect();
    match next_page_token {
        Some(token) => json!({"history": {"events": events}, "nextPageToken": token}),
        None => json!({"history": {"events": events}}),
    }
}

#[tokio::test]
async fn test_fetch_history_follows_continuation_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .and(bearer_token("test-key"))
        .and(query_param("execution.runId", "run-1"))
        .and(query_param_is_missing("nextPageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(&[1, 2], Some("t1"))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .and(query_param("nextPageToken", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(&[3], Some("t2"))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .and(query_param("nextPageToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(&[4], None)))
        .expect(1)
        .mount(&server)
        .await;

    let events = client_for(&server)
        .fetch_history(&execution())
        .await
        .expect("history");

    let ids: Vec<i64> = events.iter().map(|event| event.event_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_fetch_history_stops_on_empty_token() {
    // Some engines render the final page's absent token as an empty string
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .and(query_param_is_missing("nextPageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(&[1], Some(""))))
        .expect(1)
        .mount(&server)
        .await;

    let events = client_for(&server)
        .fetch_history(&execution())
        .await
        .expect("history");
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_fetch_history_without_run_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .and(query_param_is_missing("execution.runId"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_page(&[1], None)))
        .expect(1)
        .mount(&server)
        .await;

    let no_run_id = ExecutionId {
        run_id: None,
        ..execution()
    };
    let events = client_for(&server)
        .fetch_history(&no_run_id)
        .await
        .expect("history");
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_fetch_history_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_history(&execution()).await;
    assert!(matches!(result, Err(TimelineError::NotFound(id)) if id == "order-42"));
}

#[tokio::test]
async fn test_fetch_history_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("history backend unavailable"))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_history(&execution()).await;
    match result {
        Err(TimelineError::Upstream { status, message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("unavailable"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_relays_engine_response() {
    let server = MockServer::start().await;
    let body = json!({
        "executions": [{"execution": {"workflowId": "order-42", "runId": "run-1"}}],
        "nextPageToken": ""
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/workflows"))
        .and(bearer_token("test-key"))
        .and(query_param("query", "WorkflowType='order-processing'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .search_workflows("default", "WorkflowType='order-processing'")
        .await
        .expect("search");
    assert_eq!(result, body);
}

#[tokio::test]
async fn test_search_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/workflows"))
        .respond_with(ResponseTemplate::new(403).set_body_string("namespace access denied"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .search_workflows("default", "WorkflowType='order-processing'")
        .await;
    assert!(matches!(
        result,
        Err(TimelineError::Upstream { status: 403, .. })
    ));
}
