// Workflow timeline HTTP routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use runlens_contracts::history::ExecutionId;
use runlens_contracts::timeline::WorkflowTimeline;
use runlens_core::{HistoryFetcher, TimelineError, WorkflowTreeAssembler};

use crate::common::ErrorResponse;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Query parameters identifying the workflow execution to reconstruct
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkflowQuery {
    /// Workflow id of the root execution.
    pub id: String,
    /// Namespace the execution lives in.
    pub namespace: String,
    /// Run id of the root execution.
    #[serde(rename = "runId")]
    pub run_id: String,
}

/// App state for workflow routes
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<WorkflowTreeAssembler>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn HistoryFetcher>) -> Self {
        Self {
            assembler: Arc::new(WorkflowTreeAssembler::new(fetcher)),
        }
    }
}

/// Create workflow routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/workflow", get(get_workflow))
        .with_state(state)
}

/// GET /workflow - Reconstruct the timeline for a workflow execution
#[utoipa::path(
    get,
    path = "/workflow",
    params(WorkflowQuery),
    responses(
        (status = 200, description = "Timeline for the execution and its direct children", body = WorkflowTimeline),
        (status = 400, description = "Missing or malformed query parameters"),
        (status = 404, description = "Workflow execution not found", body = ErrorResponse),
        (status = 500, description = "Upstream engine error", body = ErrorResponse)
    ),
    tag = "workflows"
)]
pub async fn get_workflow(
    State(state): State<AppState>,
    Query(query): Query<WorkflowQuery>,
) -> Result<Json<WorkflowTimeline>, (StatusCode, Json<ErrorResponse>)> {
    let execution = ExecutionId {
        namespace: query.namespace,
        workflow_id: query.id,
        run_id: Some(query.run_id),
    };

    let timeline = state
        .assembler
        .assemble_timeline(&execution)
        .await
        .map_err(|e| match e {
            TimelineError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(e.to_string())),
            ),
            _ => {
                tracing::error!("Failed to assemble workflow timeline: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(e.to_string())),
                )
            }
        })?;

    Ok(Json(timeline))
}
