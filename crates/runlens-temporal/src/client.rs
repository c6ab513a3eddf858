// Engine HTTP API client
//
// History retrieval follows the engine's continuation token until exhausted,
// accumulating events in arrival order. No retries anywhere: one upstream
// failure aborts the whole operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use runlens_contracts::{ExecutionId, HistoryEvent};
use runlens_core::error::{Result, TimelineError};
use runlens_core::traits::{HistoryFetcher, WorkflowSearcher};

use crate::config::TemporalConfig;

/// One page of a paginated history response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryPage {
    history: Option<HistoryBody>,
    /// Opaque continuation token; absent or empty on the final page
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    #[serde(default)]
    events: Vec<HistoryEvent>,
}

/// HTTP client for the engine's workflow API
pub struct TemporalClient {
    client: Client,
    config: TemporalConfig,
}

impl TemporalClient {
    /// Create a new client from configuration
    pub fn new(config: TemporalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs()))
            .build()
            .map_err(|e| TimelineError::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn history_url(&self, execution: &ExecutionId) -> String {
        format!(
            "{}/api/v1/namespaces/{}/workflows/{}/history",
            self.config.endpoint, execution.namespace, execution.workflow_id
        )
    }

    async fn fetch_history_page(
        &self,
        execution: &ExecutionId,
        page_token: Option<&str>,
    ) -> Result<HistoryPage> {
        let mut request = self
            .client
            .get(self.history_url(execution))
            .header("Authorization", format!("Bearer {}", self.config.api_key));
        if let Some(run_id) = execution.run_id.as_deref() {
            request = request.query(&[("execution.runId", run_id)]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("nextPageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TimelineError::http(format!("History request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TimelineError::not_found(&execution.workflow_id));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TimelineError::upstream(status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| TimelineError::decode(format!("Invalid history page: {}", e)))
    }
}

// ============================================================================
// HistoryFetcher implementation
// ============================================================================

#[async_trait]
impl HistoryFetcher for TemporalClient {
    async fn fetch_history(&self, execution: &ExecutionId) -> Result<Vec<HistoryEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_history_page(execution, page_token.as_deref())
                .await?;
            if let Some(body) = page.history {
                events.extend(body.events);
            }
            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        tracing::debug!(
            "Fetched {} history events for workflow {}",
            events.len(),
            execution.workflow_id
        );
        Ok(events)
    }
}

// ============================================================================
// WorkflowSearcher implementation
// ============================================================================

#[async_trait]
impl WorkflowSearcher for TemporalClient {
    async fn search_workflows(&self, namespace: &str, query: &str) -> Result<Value> {
        let url = format!(
            "{}/api/v1/namespaces/{}/workflows",
            self.config.endpoint, namespace
        );
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| TimelineError::http(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TimelineError::upstream(status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| TimelineError::decode(format!("Invalid search response: {}", e)))
    }
}
