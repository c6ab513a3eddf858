// Timeline reconstruction state machine
//
// One execution's event log interleaves the workflow's own lifecycle markers
// with the activities it schedules and the children it spawns. Activity events
// do not name their owning workflow on the wire, so the parser tracks which
// workflow is currently narrating via a scope stack and attributes orphan
// events to its top. The pass is pure: all state lives in the parser value
// and is dropped with it when the items are returned.

use std::collections::HashMap;

use runlens_contracts::{
    ActivitySpan, EventType, HistoryEvent, SpanStatus, TimelineItem, TypeName, WorkflowSpan,
};

/// Single-pass reconstructor of timeline items from one execution's event log.
///
/// Deterministic and total over well-formed input: unrecognized event kinds
/// are ignored, recognized kinds with missing attributes skip their effect,
/// and unmatched lifecycle events are dropped silently. Items are appended at
/// first mention and mutated in place afterwards, so the output order is
/// first-appearance order.
pub struct HistoryParser {
    /// Append-only output sequence
    items: Vec<TimelineItem>,
    /// Workflow id -> index into `items`, for O(1) correlation
    workflows: HashMap<String, usize>,
    /// Workflows currently in scope; the top owns the next activity event
    scope_stack: Vec<String>,
    /// Owning workflow id -> indices of its non-terminal activity spans,
    /// in schedule order
    open_activities: HashMap<String, Vec<usize>>,
}

impl HistoryParser {
    /// Reconstruct the ordered timeline for one execution's event list.
    pub fn parse(events: &[HistoryEvent]) -> Vec<TimelineItem> {
        let mut parser = HistoryParser {
            items: Vec::new(),
            workflows: HashMap::new(),
            scope_stack: Vec::new(),
            open_activities: HashMap::new(),
        };
        for event in events {
            parser.apply(event);
        }
        parser.items
    }

    fn apply(&mut self, event: &HistoryEvent) {
        match event.event_type {
            EventType::WorkflowExecutionStarted => self.on_workflow_started(event),
            EventType::WorkflowExecutionCompleted => {
                self.on_workflow_closed(event, SpanStatus::Completed)
            }
            EventType::WorkflowExecutionFailed => {
                self.on_workflow_closed(event, SpanStatus::Failed)
            }
            EventType::WorkflowExecutionTimedOut => {
                self.on_workflow_closed(event, SpanStatus::TimedOut)
            }
            EventType::WorkflowExecutionCanceled => {
                self.on_workflow_closed(event, SpanStatus::Canceled)
            }
            EventType::WorkflowExecutionTerminated => {
                self.on_workflow_closed(event, SpanStatus::Terminated)
            }
            EventType::ActivityTaskScheduled => self.on_activity_scheduled(event),
            EventType::ActivityTaskStarted => self.on_activity_started(event),
            EventType::ActivityTaskCompleted => {
                self.on_activity_closed(event, SpanStatus::Completed)
            }
            EventType::ActivityTaskFailed => self.on_activity_closed(event, SpanStatus::Failed),
            EventType::ActivityTaskTimedOut => {
                self.on_activity_closed(event, SpanStatus::TimedOut)
            }
            EventType::ActivityTaskCanceled => {
                self.on_activity_closed(event, SpanStatus::Canceled)
            }
            EventType::StartChildWorkflowExecutionInitiated => self.on_child_initiated(event),
            EventType::ChildWorkflowExecutionStarted => self.on_child_started(event),
            EventType::ChildWorkflowExecutionCompleted => self.on_child_completed(event),
            EventType::Unknown => {}
        }
    }

    /// The execution's own start marker opens the outermost scope.
    fn on_workflow_started(&mut self, event: &HistoryEvent) {
        let Some(attrs) = event.workflow_execution_started_event_attributes.as_ref() else {
            return;
        };
        if attrs.workflow_id.is_empty() {
            return;
        }

        match self.workflows.get(&attrs.workflow_id).copied() {
            Some(index) => {
                // One span per workflow id; a repeated start marker only
                // fills fields the span does not have yet
                if let Some(span) = self
                    .items
                    .get_mut(index)
                    .and_then(TimelineItem::workflow_span_mut)
                {
                    if span.start_time.is_none() {
                        span.start_time = event.event_time;
                    }
                    if span.run_id.is_none() {
                        span.run_id = some_nonempty(&attrs.first_execution_run_id);
                    }
                    if span.workflow_type.is_none() {
                        span.workflow_type = type_name(attrs.workflow_type.as_ref());
                    }
                    if span.input.is_none() {
                        span.input = attrs.input.clone();
                    }
                    span.event_ids.push(event.event_id);
                }
            }
            None => {
                let parent = attrs.parent_workflow_execution.as_ref();
                let span = WorkflowSpan {
                    workflow_id: attrs.workflow_id.clone(),
                    run_id: some_nonempty(&attrs.first_execution_run_id),
                    workflow_type: type_name(attrs.workflow_type.as_ref()),
                    status: SpanStatus::Running,
                    start_time: event.event_time,
                    end_time: None,
                    event_ids: vec![event.event_id],
                    input: attrs.input.clone(),
                    result: None,
                    parent_workflow_id: parent.and_then(|p| some_nonempty(&p.workflow_id)),
                    parent_run_id: parent.and_then(|p| some_nonempty(&p.run_id)),
                    workflow_task_completed_event_id: None,
                };
                self.append_workflow(TimelineItem::Workflow(span));
            }
        }
        self.scope_stack.push(attrs.workflow_id.clone());
    }

    /// Terminal markers do not carry their subject's id; the innermost open
    /// scope is the subject. The pop happens whether or not a span was
    /// updated, and closed spans are never reopened or re-closed.
    fn on_workflow_closed(&mut self, event: &HistoryEvent, status: SpanStatus) {
        let Some(workflow_id) = self.scope_stack.pop() else {
            return;
        };
        let Some(index) = self.workflows.get(&workflow_id).copied() else {
            return;
        };
        let Some(span) = self
            .items
            .get_mut(index)
            .and_then(TimelineItem::workflow_span_mut)
        else {
            return;
        };
        if span.status.is_terminal() {
            return;
        }
        span.status = status;
        span.end_time = event.event_time;
        span.event_ids.push(event.event_id);
    }

    fn on_activity_scheduled(&mut self, event: &HistoryEvent) {
        let Some(attrs) = event.activity_task_scheduled_event_attributes.as_ref() else {
            return;
        };
        let Some(owner) = self.scope_stack.last().cloned() else {
            return;
        };

        let span = ActivitySpan {
            activity_id: attrs.activity_id.clone(),
            activity_type: type_name(attrs.activity_type.as_ref()),
            workflow_id: owner.clone(),
            status: SpanStatus::Scheduled,
            // Schedule time stands in as the start until the task starts
            start_time: event.event_time,
            end_time: None,
            event_ids: vec![event.event_id],
            result: None,
            workflow_task_completed_event_id: attrs.workflow_task_completed_event_id,
        };
        self.open_activities
            .entry(owner)
            .or_default()
            .push(self.items.len());
        self.items.push(TimelineItem::Activity(span));
    }

    fn on_activity_started(&mut self, event: &HistoryEvent) {
        let Some(owner) = self.scope_stack.last() else {
            return;
        };
        let Some(index) =
            self.find_open_activity(owner, |span| span.status == SpanStatus::Scheduled)
        else {
            return;
        };
        if let Some(span) = self
            .items
            .get_mut(index)
            .and_then(TimelineItem::activity_span_mut)
        {
            span.status = SpanStatus::Started;
            span.start_time = event.event_time;
            span.event_ids.push(event.event_id);
        }
    }

    fn on_activity_closed(&mut self, event: &HistoryEvent, status: SpanStatus) {
        let Some(owner) = self.scope_stack.last().cloned() else {
            return;
        };
        let Some(index) = self.find_open_activity(&owner, |span| !span.status.is_terminal())
        else {
            return;
        };
        if let Some(span) = self
            .items
            .get_mut(index)
            .and_then(TimelineItem::activity_span_mut)
        {
            span.status = status;
            span.end_time = event.event_time;
            span.event_ids.push(event.event_id);
            if status == SpanStatus::Completed {
                if let Some(attrs) = event.activity_task_completed_event_attributes.as_ref() {
                    if let Some(result) = attrs.result.as_ref() {
                        span.result = Some(result.clone());
                    }
                }
            }
        }
        if let Some(open) = self.open_activities.get_mut(&owner) {
            open.retain(|&open_index| open_index != index);
        }
    }

    /// A start-child decision creates a placeholder span so the child shows
    /// up on the timeline even before (or without) its start being observed.
    /// The placeholder is not a scope: it never receives activity events.
    fn on_child_initiated(&mut self, event: &HistoryEvent) {
        let Some(attrs) = event
            .start_child_workflow_execution_initiated_event_attributes
            .as_ref()
        else {
            return;
        };
        if attrs.workflow_id.is_empty() {
            return;
        }

        match self.workflows.get(&attrs.workflow_id).copied() {
            Some(index) => {
                if let Some(span) = self
                    .items
                    .get_mut(index)
                    .and_then(TimelineItem::workflow_span_mut)
                {
                    if event.event_time.is_some() {
                        span.start_time = event.event_time;
                    }
                    if attrs.workflow_task_completed_event_id.is_some() {
                        span.workflow_task_completed_event_id =
                            attrs.workflow_task_completed_event_id;
                    }
                    span.event_ids.push(event.event_id);
                }
            }
            None => {
                let (parent_workflow_id, parent_run_id) = self.scope_parent();
                let span = WorkflowSpan {
                    workflow_id: attrs.workflow_id.clone(),
                    // Run id is unknown until a correlating start event arrives
                    run_id: None,
                    workflow_type: type_name(attrs.workflow_type.as_ref()),
                    status: SpanStatus::Running,
                    start_time: event.event_time,
                    end_time: None,
                    event_ids: vec![event.event_id],
                    input: attrs.input.clone(),
                    result: None,
                    parent_workflow_id,
                    parent_run_id,
                    workflow_task_completed_event_id: attrs.workflow_task_completed_event_id,
                };
                self.append_workflow(TimelineItem::ChildWorkflow(span));
            }
        }
    }

    /// An observed child start resolves or creates the child's span and opens
    /// a scope for it. Nothing pops that scope when the child completes (see
    /// `on_child_completed`), so a parent-level terminal marker arriving while
    /// the child scope is still open lands on the child, not the parent.
    fn on_child_started(&mut self, event: &HistoryEvent) {
        let Some(attrs) = event.child_workflow_execution_started_event_attributes.as_ref() else {
            return;
        };
        let Some(execution) = attrs.workflow_execution.as_ref() else {
            return;
        };
        if execution.workflow_id.is_empty() {
            return;
        }

        match self.workflows.get(&execution.workflow_id).copied() {
            Some(index) => {
                if let Some(span) = self
                    .items
                    .get_mut(index)
                    .and_then(TimelineItem::workflow_span_mut)
                {
                    if event.event_time.is_some() {
                        span.start_time = event.event_time;
                    }
                    if span.run_id.is_none() {
                        span.run_id = some_nonempty(&execution.run_id);
                    }
                    if span.workflow_type.is_none() {
                        span.workflow_type = type_name(attrs.workflow_type.as_ref());
                    }
                    span.event_ids.push(event.event_id);
                }
            }
            None => {
                let (parent_workflow_id, parent_run_id) = self.scope_parent();
                let span = WorkflowSpan {
                    workflow_id: execution.workflow_id.clone(),
                    run_id: some_nonempty(&execution.run_id),
                    workflow_type: type_name(attrs.workflow_type.as_ref()),
                    status: SpanStatus::Running,
                    start_time: event.event_time,
                    end_time: None,
                    event_ids: vec![event.event_id],
                    input: None,
                    result: None,
                    parent_workflow_id,
                    parent_run_id,
                    workflow_task_completed_event_id: None,
                };
                self.append_workflow(TimelineItem::ChildWorkflow(span));
            }
        }
        self.scope_stack.push(execution.workflow_id.clone());
    }

    /// Child completions carry the subject's id, so resolution is direct and
    /// the scope stack is left alone.
    fn on_child_completed(&mut self, event: &HistoryEvent) {
        let Some(attrs) = event
            .child_workflow_execution_completed_event_attributes
            .as_ref()
        else {
            return;
        };
        let Some(execution) = attrs.workflow_execution.as_ref() else {
            return;
        };
        let Some(index) = self.workflows.get(&execution.workflow_id).copied() else {
            return;
        };
        let Some(span) = self
            .items
            .get_mut(index)
            .and_then(TimelineItem::workflow_span_mut)
        else {
            return;
        };
        if span.status.is_terminal() {
            return;
        }
        span.status = SpanStatus::Completed;
        span.end_time = event.event_time;
        span.event_ids.push(event.event_id);
        if let Some(result) = attrs.result.as_ref() {
            span.result = Some(result.clone());
        }
    }

    fn append_workflow(&mut self, item: TimelineItem) {
        if let Some(span) = item.workflow_span() {
            self.workflows.insert(span.workflow_id.clone(), self.items.len());
        }
        self.items.push(item);
    }

    /// Most recently opened activity of `owner` that satisfies `matches`.
    fn find_open_activity(
        &self,
        owner: &str,
        matches: impl Fn(&ActivitySpan) -> bool,
    ) -> Option<usize> {
        let open = self.open_activities.get(owner)?;
        open.iter().rev().copied().find(|&index| {
            self.items
                .get(index)
                .and_then(TimelineItem::activity_span)
                .map(|span| matches(span))
                .unwrap_or(false)
        })
    }

    /// Parent identity for a child span, read from the current scope top.
    fn scope_parent(&self) -> (Option<String>, Option<String>) {
        let Some(workflow_id) = self.scope_stack.last() else {
            return (None, None);
        };
        let run_id = self
            .workflows
            .get(workflow_id)
            .copied()
            .and_then(|index| self.items.get(index))
            .and_then(TimelineItem::workflow_span)
            .and_then(|span| span.run_id.clone());
        (Some(workflow_id.clone()), run_id)
    }
}

fn some_nonempty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn type_name(name: Option<&TypeName>) -> Option<String> {
    name.map(|type_name| type_name.name.clone())
        .filter(|name| !name.is_empty())
}
