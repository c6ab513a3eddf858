// Core traits for pluggable engine backends
//
// These traits separate the reconstruction logic from the engine's HTTP API:
// - A real client implementation for production
// - Canned fixtures for unit tests

use async_trait::async_trait;
use runlens_contracts::{ExecutionId, HistoryEvent};
use serde_json::Value;

use crate::error::Result;

/// Trait for retrieving one execution's complete event log
///
/// Implementations own pagination: they follow the engine's continuation
/// token until exhausted and return the accumulated events in arrival order.
/// They know nothing about event semantics.
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    /// Fetch the full ordered event log for the given execution
    async fn fetch_history(&self, execution: &ExecutionId) -> Result<Vec<HistoryEvent>>;
}

/// Trait for free-text workflow search against the engine
///
/// Search is a pass-through query with no local processing; the engine's
/// response body is relayed verbatim.
#[async_trait]
pub trait WorkflowSearcher: Send + Sync {
    /// Run a visibility query in the given namespace
    async fn search_workflows(&self, namespace: &str, query: &str) -> Result<Value>;
}
