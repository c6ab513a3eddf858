// Raw workflow history types
//
// These mirror the engine's protojson rendering of one execution's event log:
// camelCase keys, int64 fields as strings, enum values spelled EVENT_TYPE_*.
// Only the event kinds and attribute fields the timeline reconstruction reads
// are modeled; everything else is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};
use serde_json::Value;

/// Identity of one workflow execution, as used for history retrieval.
///
/// `run_id` may be unknown for a child that was initiated but never observed
/// starting; the engine then resolves the latest run for the workflow id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionId {
    pub namespace: String,
    pub workflow_id: String,
    pub run_id: Option<String>,
}

/// Discriminant of a history event, as the engine names it on the wire.
///
/// Unknown names deserialize to [`EventType::Unknown`] so that new engine
/// event kinds never break history retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum EventType {
    #[serde(rename = "EVENT_TYPE_WORKFLOW_EXECUTION_STARTED")]
    WorkflowExecutionStarted,
    #[serde(rename = "EVENT_TYPE_WORKFLOW_EXECUTION_COMPLETED")]
    WorkflowExecutionCompleted,
    #[serde(rename = "EVENT_TYPE_WORKFLOW_EXECUTION_FAILED")]
    WorkflowExecutionFailed,
    #[serde(rename = "EVENT_TYPE_WORKFLOW_EXECUTION_TIMED_OUT")]
    WorkflowExecutionTimedOut,
    #[serde(rename = "EVENT_TYPE_WORKFLOW_EXECUTION_CANCELED")]
    WorkflowExecutionCanceled,
    #[serde(rename = "EVENT_TYPE_WORKFLOW_EXECUTION_TERMINATED")]
    WorkflowExecutionTerminated,
    #[serde(rename = "EVENT_TYPE_ACTIVITY_TASK_SCHEDULED")]
    ActivityTaskScheduled,
    #[serde(rename = "EVENT_TYPE_ACTIVITY_TASK_STARTED")]
    ActivityTaskStarted,
    #[serde(rename = "EVENT_TYPE_ACTIVITY_TASK_COMPLETED")]
    ActivityTaskCompleted,
    #[serde(rename = "EVENT_TYPE_ACTIVITY_TASK_FAILED")]
    ActivityTaskFailed,
    #[serde(rename = "EVENT_TYPE_ACTIVITY_TASK_TIMED_OUT")]
    ActivityTaskTimedOut,
    #[serde(rename = "EVENT_TYPE_ACTIVITY_TASK_CANCELED")]
    ActivityTaskCanceled,
    #[serde(rename = "EVENT_TYPE_START_CHILD_WORKFLOW_EXECUTION_INITIATED")]
    StartChildWorkflowExecutionInitiated,
    #[serde(rename = "EVENT_TYPE_CHILD_WORKFLOW_EXECUTION_STARTED")]
    ChildWorkflowExecutionStarted,
    #[serde(rename = "EVENT_TYPE_CHILD_WORKFLOW_EXECUTION_COMPLETED")]
    ChildWorkflowExecutionCompleted,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One immutable record from an execution's event log.
///
/// `event_id` is the monotonically increasing sequence id within the
/// execution; the log is authoritative in that order. Exactly one of the
/// attribute payloads is populated per event; a recognized kind whose
/// attributes are missing simply has no effect on the timeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEvent {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub event_id: i64,
    pub event_time: Option<DateTime<Utc>>,
    pub event_type: EventType,
    pub workflow_execution_started_event_attributes: Option<WorkflowExecutionStartedAttributes>,
    pub activity_task_scheduled_event_attributes: Option<ActivityTaskScheduledAttributes>,
    pub activity_task_completed_event_attributes: Option<ActivityTaskCompletedAttributes>,
    pub start_child_workflow_execution_initiated_event_attributes:
        Option<StartChildWorkflowInitiatedAttributes>,
    pub child_workflow_execution_started_event_attributes: Option<ChildWorkflowStartedAttributes>,
    pub child_workflow_execution_completed_event_attributes:
        Option<ChildWorkflowCompletedAttributes>,
}

/// Workflow or activity type name wrapper, as the engine nests it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeName {
    pub name: String,
}

/// A (workflow id, run id) pair embedded in child-workflow events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowExecutionRef {
    pub workflow_id: String,
    pub run_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowExecutionStartedAttributes {
    pub workflow_id: String,
    pub workflow_type: Option<TypeName>,
    pub first_execution_run_id: String,
    pub input: Option<Value>,
    pub parent_workflow_execution: Option<WorkflowExecutionRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityTaskScheduledAttributes {
    pub activity_id: String,
    pub activity_type: Option<TypeName>,
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    pub workflow_task_completed_event_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityTaskCompletedAttributes {
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartChildWorkflowInitiatedAttributes {
    pub workflow_id: String,
    pub workflow_type: Option<TypeName>,
    pub input: Option<Value>,
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    pub workflow_task_completed_event_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChildWorkflowStartedAttributes {
    pub workflow_execution: Option<WorkflowExecutionRef>,
    pub workflow_type: Option<TypeName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChildWorkflowCompletedAttributes {
    pub workflow_execution: Option<WorkflowExecutionRef>,
    pub result: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_started_event() {
        let event: HistoryEvent = serde_json::from_value(json!({
            "eventId": "1",
            "eventTime": "2024-05-03T10:00:00.123456Z",
            "eventType": "EVENT_TYPE_WORKFLOW_EXECUTION_STARTED",
            "workflowExecutionStartedEventAttributes": {
                "workflowType": { "name": "order-processing" },
                "workflowId": "order-42",
                "firstExecutionRunId": "run-1",
                "input": { "payloads": [{ "data": "eyJvcmRlciI6NDJ9" }] }
            }
        }))
        .unwrap();

        assert_eq!(event.event_id, 1);
        assert_eq!(event.event_type, EventType::WorkflowExecutionStarted);
        assert!(event.event_time.is_some());

        let attrs = event.workflow_execution_started_event_attributes.unwrap();
        assert_eq!(attrs.workflow_id, "order-42");
        assert_eq!(attrs.first_execution_run_id, "run-1");
        assert_eq!(attrs.workflow_type.unwrap().name, "order-processing");
        assert!(attrs.input.is_some());
        assert!(attrs.parent_workflow_execution.is_none());
    }

    #[test]
    fn test_deserialize_numeric_event_id() {
        // Some tooling emits int64 fields as JSON numbers rather than strings
        let event: HistoryEvent = serde_json::from_value(json!({
            "eventId": 7,
            "eventType": "EVENT_TYPE_ACTIVITY_TASK_SCHEDULED",
            "activityTaskScheduledEventAttributes": {
                "activityId": "5",
                "activityType": { "name": "charge-card" },
                "workflowTaskCompletedEventId": "4"
            }
        }))
        .unwrap();

        assert_eq!(event.event_id, 7);
        let attrs = event.activity_task_scheduled_event_attributes.unwrap();
        assert_eq!(attrs.activity_id, "5");
        assert_eq!(attrs.workflow_task_completed_event_id, Some(4));
    }

    #[test]
    fn test_unknown_event_type_and_missing_fields() {
        let event: HistoryEvent = serde_json::from_value(json!({
            "eventId": "12",
            "eventType": "EVENT_TYPE_TIMER_STARTED",
            "timerStartedEventAttributes": { "timerId": "t1" }
        }))
        .unwrap();

        assert_eq!(event.event_type, EventType::Unknown);
        assert!(event.event_time.is_none());
    }

    #[test]
    fn test_deserialize_child_started_event() {
        let event: HistoryEvent = serde_json::from_value(json!({
            "eventId": "9",
            "eventTime": "2024-05-03T10:00:05Z",
            "eventType": "EVENT_TYPE_CHILD_WORKFLOW_EXECUTION_STARTED",
            "childWorkflowExecutionStartedEventAttributes": {
                "workflowExecution": { "workflowId": "child-1", "runId": "run-c1" },
                "workflowType": { "name": "shipment" }
            }
        }))
        .unwrap();

        let attrs = event.child_workflow_execution_started_event_attributes.unwrap();
        let execution = attrs.workflow_execution.unwrap();
        assert_eq!(execution.workflow_id, "child-1");
        assert_eq!(execution.run_id, "run-c1");
    }
}
