// Runlens API server
// Decision: read-only facade over the engine's HTTP API; handlers depend on
//   the fetch/search traits so they stay testable with in-memory stubs

mod common;
mod search;
mod workflow;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use runlens_contracts::timeline::{
    ActivitySpan, SpanStatus, TimelineItem, WorkflowSpan, WorkflowTimeline,
};
use runlens_temporal::{TemporalClient, TemporalConfig};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Serve the generated OpenAPI document
async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        workflow::get_workflow,
        search::search_workflows,
    ),
    components(
        schemas(
            WorkflowTimeline,
            TimelineItem,
            WorkflowSpan,
            ActivitySpan,
            SpanStatus,
            common::ErrorResponse,
        )
    ),
    tags(
        (name = "workflows", description = "Workflow timeline reconstruction endpoints"),
        (name = "search", description = "Workflow visibility search endpoints")
    ),
    info(
        title = "Runlens API",
        version = "0.1.0",
        description = "API for reconstructing workflow execution timelines from event histories",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "runlens_api=debug,runlens_core=debug,runlens_temporal=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("runlens-api starting...");

    // Engine connection is mandatory; refuse to start without it
    let config = TemporalConfig::from_env().context("Failed to load engine configuration")?;
    tracing::info!(endpoint = %config.endpoint, "Engine endpoint configured");

    let client = Arc::new(TemporalClient::new(config)?);

    // Create module-specific states
    let workflow_state = workflow::AppState::new(client.clone());
    let search_state = search::AppState::new(client);

    // Load CORS allowed origins from environment (optional)
    // Only needed when the UI is served from a different origin than the API
    // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    let app = app_router(workflow_state, search_state);

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Assemble the full route tree (extracted for testing)
fn app_router(workflow_state: workflow::AppState, search_state: search::AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-doc/openapi.json", get(openapi_spec))
        .merge(workflow::routes(workflow_state))
        .merge(search::routes(search_state))
}
