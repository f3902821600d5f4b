//! Progress reporting. The runner emits one event stream regardless of how
//! it was invoked; sinks decide presentation.

use crate::spec::StepSpec;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Started,
    Completed,
    Skipped,
    Failed,
}

impl ProgressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressKind::Started => "started",
            ProgressKind::Completed => "completed",
            ProgressKind::Skipped => "skipped",
            ProgressKind::Failed => "failed",
        }
    }

    /// Whether this event closes out its step.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressKind::Started)
    }
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a run. `phase` is the step id; `step_index` is
/// zero-based position in the executed sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub phase: String,
    pub message: String,
    pub step_index: usize,
    pub total_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProgressEvent {
    pub fn started(step: &StepSpec, step_index: usize, total_steps: usize) -> Self {
        Self {
            kind: ProgressKind::Started,
            phase: step.id.clone(),
            message: step.progress_text().to_string(),
            step_index,
            total_steps,
            data: None,
        }
    }

    pub fn completed(step: &StepSpec, step_index: usize, total_steps: usize) -> Self {
        Self {
            kind: ProgressKind::Completed,
            phase: step.id.clone(),
            message: format!("{} \u{2713}", step.name),
            step_index,
            total_steps,
            data: None,
        }
    }

    pub fn skipped(step: &StepSpec, step_index: usize, total_steps: usize, error: &str) -> Self {
        Self {
            kind: ProgressKind::Skipped,
            phase: step.id.clone(),
            message: format!("{}: {}", step.name, error),
            step_index,
            total_steps,
            data: Some(json!({ "error": error })),
        }
    }

    pub fn failed(step: &StepSpec, step_index: usize, total_steps: usize, error: &str) -> Self {
        Self {
            kind: ProgressKind::Failed,
            phase: step.id.clone(),
            message: format!("{}: {}", step.name, error),
            step_index,
            total_steps,
            data: Some(json!({ "error": error })),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Collects events in memory, mainly for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("progress sink lock poisoned").clone()
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, event: &ProgressEvent) {
        self.events.lock().expect("progress sink lock poisoned").push(event.clone());
    }
}

/// Forwards events to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: &ProgressEvent) {
        tracing::info!(
            kind = %event.kind,
            phase = %event.phase,
            step = event.step_index + 1,
            of = event.total_steps,
            "{}",
            event.message
        );
    }
}

/// Bridges events onto a channel so another thread can render them. A
/// departed consumer never fails the run; sends to a closed channel are
/// dropped.
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: crossbeam_channel::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    pub fn unbounded() -> (Self, crossbeam_channel::Receiver<ProgressEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: &ProgressEvent) {
        let _ = self.tx.send(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> StepSpec {
        serde_yaml::from_str("id: create\nname: Create workspace\noperation: domain.create\n")
            .unwrap()
    }

    #[test]
    fn event_messages_follow_step_outcome() {
        let step = step();
        assert_eq!(ProgressEvent::started(&step, 0, 3).message, "Create workspace");
        assert_eq!(ProgressEvent::completed(&step, 0, 3).message, "Create workspace \u{2713}");
        let skipped = ProgressEvent::skipped(&step, 0, 3, "timeout");
        assert_eq!(skipped.message, "Create workspace: timeout");
        assert_eq!(skipped.data, Some(json!({ "error": "timeout" })));
    }

    #[test]
    fn started_uses_progress_message_when_present() {
        let step: StepSpec = serde_yaml::from_str(
            "id: create\nname: Create workspace\noperation: domain.create\nprogress_message: Creating your workspace\n",
        )
        .unwrap();
        assert_eq!(ProgressEvent::started(&step, 0, 1).message, "Creating your workspace");
    }

    #[test]
    fn terminal_kinds() {
        assert!(!ProgressKind::Started.is_terminal());
        assert!(ProgressKind::Completed.is_terminal());
        assert!(ProgressKind::Skipped.is_terminal());
        assert!(ProgressKind::Failed.is_terminal());
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        let step = step();
        sink.emit(&ProgressEvent::started(&step, 0, 2));
        sink.emit(&ProgressEvent::completed(&step, 0, 2));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ProgressKind::Started);
        assert_eq!(events[1].kind, ProgressKind::Completed);
    }

    #[test]
    fn channel_sink_delivers_and_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::unbounded();
        let step = step();
        sink.emit(&ProgressEvent::started(&step, 0, 1));
        assert_eq!(rx.recv().unwrap().kind, ProgressKind::Started);
        drop(rx);
        // Does not panic once the consumer is gone.
        sink.emit(&ProgressEvent::completed(&step, 0, 1));
    }

    #[test]
    fn serialized_event_omits_empty_data() {
        let step = step();
        let json = serde_json::to_string(&ProgressEvent::started(&step, 0, 1)).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(json.contains("\"kind\":\"started\""));
        assert!(json.contains("\"phase\":\"create\""));
    }
}
