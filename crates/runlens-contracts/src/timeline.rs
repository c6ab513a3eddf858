// Reconstructed timeline types
//
// A timeline is the ordered list of spans rebuilt from one execution's event
// log. Items carry a `type` discriminant on the wire so visualization clients
// can switch on workflow / childWorkflow / activity rows directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Lifecycle state of a span.
///
/// Workflow spans move RUNNING -> terminal; activity spans move
/// SCHEDULED -> STARTED -> terminal. Terminal states are never overwritten
/// by later events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanStatus {
    Running,
    Scheduled,
    Started,
    Completed,
    Failed,
    TimedOut,
    Canceled,
    Terminated,
}

impl SpanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            SpanStatus::Running | SpanStatus::Scheduled | SpanStatus::Started
        )
    }
}

/// One workflow execution as a span, either the root or a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpan {
    pub workflow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<String>,
    pub status: SpanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Ids of the history events that contributed to this span, in log order.
    pub event_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_run_id: Option<String>,
    /// Event id of the workflow task that decided to start this child, when
    /// the span was created from a StartChildWorkflowExecutionInitiated event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_task_completed_event_id: Option<i64>,
}

/// One activity invocation as a span, attributed to its owning workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySpan {
    pub activity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    /// Workflow id of the scope the activity was scheduled under.
    pub workflow_id: String,
    pub status: SpanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub event_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_task_completed_event_id: Option<i64>,
}

/// One row of a reconstructed timeline, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimelineItem {
    Workflow(WorkflowSpan),
    ChildWorkflow(WorkflowSpan),
    Activity(ActivitySpan),
}

impl TimelineItem {
    /// Workflow span behind this item, for both root and child rows.
    pub fn workflow_span(&self) -> Option<&WorkflowSpan> {
        match self {
            TimelineItem::Workflow(span) | TimelineItem::ChildWorkflow(span) => Some(span),
            TimelineItem::Activity(_) => None,
        }
    }

    pub fn workflow_span_mut(&mut self) -> Option<&mut WorkflowSpan> {
        match self {
            TimelineItem::Workflow(span) | TimelineItem::ChildWorkflow(span) => Some(span),
            TimelineItem::Activity(_) => None,
        }
    }

    pub fn activity_span(&self) -> Option<&ActivitySpan> {
        match self {
            TimelineItem::Activity(span) => Some(span),
            _ => None,
        }
    }

    pub fn activity_span_mut(&mut self) -> Option<&mut ActivitySpan> {
        match self {
            TimelineItem::Activity(span) => Some(span),
            _ => None,
        }
    }
}

/// Assembled view of a root execution and its direct children.
///
/// `children` is keyed by child workflow id; a child whose history could not
/// be retrieved is simply absent from the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkflowTimeline {
    pub root: Vec<TimelineItem>,
    pub children: BTreeMap<String, Vec<TimelineItem>>,
}
