// Workflow tree assembly
//
// Fetches and parses the root execution, then resolves every child workflow
// discovered in the root timeline, exactly one level deep. A broken child is
// logged and omitted so it never takes down the root or its siblings.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future;
use runlens_contracts::{ExecutionId, TimelineItem, WorkflowTimeline};

use crate::error::Result;
use crate::parser::HistoryParser;
use crate::traits::HistoryFetcher;

/// Orchestrates history retrieval and parsing across a root execution and its
/// direct children.
pub struct WorkflowTreeAssembler {
    fetcher: Arc<dyn HistoryFetcher>,
}

impl WorkflowTreeAssembler {
    pub fn new(fetcher: Arc<dyn HistoryFetcher>) -> Self {
        Self { fetcher }
    }

    /// Build the root timeline plus a map of child timelines keyed by child
    /// workflow id.
    ///
    /// A failure fetching the root fails the whole assembly; a failure on one
    /// child only drops that child from the map. Children are not recursed
    /// into: a grandchild appears as a span inside its parent's timeline but
    /// its own history is never fetched here.
    pub async fn assemble_timeline(&self, execution: &ExecutionId) -> Result<WorkflowTimeline> {
        let events = self.fetcher.fetch_history(execution).await?;
        let root = HistoryParser::parse(&events);

        let child_executions = discover_children(&root, &execution.namespace);
        let fetches = child_executions.iter().map(|child| self.fetch_child(child));

        let mut children = BTreeMap::new();
        for (workflow_id, items) in future::join_all(fetches).await.into_iter().flatten() {
            children.insert(workflow_id, items);
        }

        Ok(WorkflowTimeline { root, children })
    }

    async fn fetch_child(&self, execution: &ExecutionId) -> Option<(String, Vec<TimelineItem>)> {
        match self.fetcher.fetch_history(execution).await {
            Ok(events) => Some((execution.workflow_id.clone(), HistoryParser::parse(&events))),
            Err(e) => {
                tracing::warn!(
                    "Failed to resolve child workflow {}: {}",
                    execution.workflow_id,
                    e
                );
                None
            }
        }
    }
}

/// Child executions referenced by a parsed timeline, in appearance order.
fn discover_children(items: &[TimelineItem], namespace: &str) -> Vec<ExecutionId> {
    items
        .iter()
        .filter_map(|item| match item {
            TimelineItem::ChildWorkflow(span) => Some(ExecutionId {
                namespace: namespace.to_string(),
                workflow_id: span.workflow_id.clone(),
                run_id: span.run_id.clone(),
            }),
            _ => None,
        })
        .collect()
}
