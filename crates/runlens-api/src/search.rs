// Workflow search HTTP routes
//
// Pass-through to the engine's visibility API; the service adds no
// interpretation of its own on top of the results.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use runlens_core::WorkflowSearcher;

use crate::common::ErrorResponse;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::IntoParams;

/// Query parameters for a visibility search
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search expression in the engine's list-filter syntax.
    pub query: String,
    /// Namespace to search in.
    pub namespace: String,
}

/// App state for search routes
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<dyn WorkflowSearcher>,
}

impl AppState {
    pub fn new(searcher: Arc<dyn WorkflowSearcher>) -> Self {
        Self { searcher }
    }
}

/// Create search routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_workflows))
        .with_state(state)
}

/// GET /search - Search workflow executions via the engine's visibility API
#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results as returned by the engine"),
        (status = 400, description = "Missing or malformed query parameters"),
        (status = 500, description = "Upstream engine error", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_workflows(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let results = state
        .searcher
        .search_workflows(&query.namespace, &query.query)
        .await
        .map_err(|e| {
            tracing::error!("Workflow search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?;

    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use runlens_core::{Result, TimelineError};
    use serde_json::json;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StubSearcher {
        response: Option<Value>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubSearcher {
        fn ok(response: Value) -> Self {
            Self {
                response: Some(response),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WorkflowSearcher for StubSearcher {
        async fn search_workflows(&self, namespace: &str, query: &str) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((namespace.to_string(), query.to_string()));
            match &self.response {
                Some(value) => Ok(value.clone()),
                None => Err(TimelineError::upstream(503, "visibility store unavailable")),
            }
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_search_relays_engine_results() {
        let results = json!({"executions": [{"workflowId": "order-42"}]});
        let searcher = Arc::new(StubSearcher::ok(results.clone()));
        let app = routes(AppState::new(searcher.clone()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/search?query=WorkflowType%3D%27order%27&namespace=default")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, results);

        let calls = searcher.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("default".to_string(), "WorkflowType='order'".to_string())]
        );
    }

    #[tokio::test]
    async fn test_search_requires_all_params() {
        for uri in ["/search", "/search?query=abc", "/search?namespace=default"] {
            let app = routes(AppState::new(Arc::new(StubSearcher::ok(json!([])))));

            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
        }
    }

    #[tokio::test]
    async fn test_search_upstream_error() {
        let app = routes(AppState::new(Arc::new(StubSearcher::failing())));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/search?query=abc&namespace=default")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("503"));
    }
}
