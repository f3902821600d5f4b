//! Sequential step execution. One failure policy decision lives here: a
//! failed step either aborts the run or degrades to a warning.

use crate::context::RunContext;
use crate::error::{LiftoffError, Result};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::registry::Registry;
use crate::spec::{OnError, StepSpec};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation shared with the caller. The runner checks the
/// flag between steps; an in-flight handler is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Summary of a completed run: what executed, what the steps produced, and
/// the warnings soft failures left behind.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub spec: String,
    pub steps_run: usize,
    pub steps_skipped: usize,
    pub results: Map<String, Value>,
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StepTally {
    pub(crate) run: usize,
    pub(crate) skipped: usize,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run steps in order against the shared context.
///
/// An operation that resolves to no handler is a configuration error when
/// the step would abort; checked up front so nothing executes. The same
/// unresolved operation on a continue step degrades to a skip when reached.
pub(crate) fn run_steps(
    spec_slug: &str,
    steps: &[StepSpec],
    registry: &Registry,
    ctx: &mut RunContext,
    sink: &dyn ProgressSink,
    cancel: &CancelFlag,
) -> Result<StepTally> {
    for step in steps {
        if step.on_error == OnError::Abort && registry.step(&step.operation).is_none() {
            return Err(LiftoffError::UnknownOperation {
                spec: spec_slug.to_string(),
                step: step.id.clone(),
                operation: step.operation.clone(),
            });
        }
    }

    let total = steps.len();
    let mut tally = StepTally::default();
    for (index, step) in steps.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(LiftoffError::Cancelled);
        }
        sink.emit(&ProgressEvent::started(step, index, total));

        let outcome = match registry.step(&step.operation) {
            Some(handler) => handler.call(ctx, step),
            None => Err(format!("unknown operation '{}'", step.operation)),
        };

        match outcome {
            Ok(()) => {
                sink.emit(&ProgressEvent::completed(step, index, total));
                tally.run += 1;
            }
            Err(message) => match step.on_error {
                OnError::Abort => {
                    sink.emit(&ProgressEvent::failed(step, index, total, &message));
                    return Err(LiftoffError::StepFailed { step: step.name.clone(), message });
                }
                OnError::Continue => {
                    ctx.warn(format!("{}: {}", step.name, message));
                    sink.emit(&ProgressEvent::skipped(step, index, total, &message));
                    tally.skipped += 1;
                }
            },
        }
    }
    Ok(tally)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{MemorySink, NullSink, ProgressKind};
    use crate::registry::FnStep;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;

    fn step(id: &str, operation: &str, on_error: OnError) -> StepSpec {
        StepSpec {
            id: id.to_string(),
            name: format!("Step {id}"),
            operation: operation.to_string(),
            order: 0,
            on_error,
            progress_message: None,
            phase: Default::default(),
            args: Map::new(),
        }
    }

    fn counting_registry(calls: Arc<AtomicUsize>) -> Registry {
        let mut registry = Registry::new();
        registry.register_step(Box::new(FnStep::new("ok", move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));
        registry.register_step(Box::new(FnStep::new("boom", |_, _| Err("kaput".into()))));
        registry
    }

    fn ctx() -> RunContext {
        RunContext::new(PathBuf::from("/tmp/x"), Map::new())
    }

    #[test]
    fn abort_step_stops_the_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let steps =
            vec![step("a", "ok", OnError::Abort), step("b", "boom", OnError::Abort), step("c", "ok", OnError::Abort)];
        let sink = MemorySink::new();
        let mut ctx = ctx();

        let err = run_steps("demo", &steps, &registry, &mut ctx, &sink, &CancelFlag::new())
            .unwrap_err();
        match err {
            LiftoffError::StepFailed { step, message } => {
                assert_eq!(step, "Step b");
                assert_eq!(message, "kaput");
            }
            other => panic!("expected StepFailed, got {other:?}"),
        }
        // Step c never executed.
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let kinds: Vec<ProgressKind> = sink.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [ProgressKind::Started, ProgressKind::Completed, ProgressKind::Started, ProgressKind::Failed]
        );
    }

    #[test]
    fn continue_step_degrades_to_warning() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let steps = vec![step("a", "boom", OnError::Continue), step("b", "ok", OnError::Abort)];
        let sink = MemorySink::new();
        let mut ctx = ctx();

        let tally =
            run_steps("demo", &steps, &registry, &mut ctx, &sink, &CancelFlag::new()).unwrap();
        assert_eq!(tally.run, 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(ctx.warnings(), &["Step a: kaput"]);

        let kinds: Vec<ProgressKind> = sink.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [ProgressKind::Started, ProgressKind::Skipped, ProgressKind::Started, ProgressKind::Completed]
        );
    }

    #[test]
    fn unknown_operation_on_continue_step_skips_when_reached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let steps = vec![step("a", "ghost.op", OnError::Continue), step("b", "ok", OnError::Abort)];
        let sink = MemorySink::new();
        let mut ctx = ctx();

        let tally =
            run_steps("demo", &steps, &registry, &mut ctx, &sink, &CancelFlag::new()).unwrap();
        assert_eq!(tally.skipped, 1);
        assert_eq!(ctx.warnings(), &["Step a: unknown operation 'ghost.op'"]);
    }

    #[test]
    fn unknown_operation_on_abort_step_fails_before_anything_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let steps = vec![step("a", "ok", OnError::Abort), step("b", "ghost.op", OnError::Abort)];
        let sink = MemorySink::new();
        let mut ctx = ctx();

        let err = run_steps("demo", &steps, &registry, &mut ctx, &sink, &CancelFlag::new())
            .unwrap_err();
        match err {
            LiftoffError::UnknownOperation { spec, step, operation } => {
                assert_eq!(spec, "demo");
                assert_eq!(step, "b");
                assert_eq!(operation, "ghost.op");
            }
            other => panic!("expected UnknownOperation, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn pre_cancelled_run_executes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let steps = vec![step("a", "ok", OnError::Abort)];
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut ctx = ctx();

        let err =
            run_steps("demo", &steps, &registry, &mut ctx, &NullSink, &cancel).unwrap_err();
        assert!(matches!(err, LiftoffError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancellation_takes_effect_between_steps() {
        struct CancelAfterFirst(CancelFlag);
        impl ProgressSink for CancelAfterFirst {
            fn emit(&self, event: &ProgressEvent) {
                if event.kind == ProgressKind::Completed {
                    self.0.cancel();
                }
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(calls.clone());
        let steps = vec![step("a", "ok", OnError::Abort), step("b", "ok", OnError::Abort)];
        let cancel = CancelFlag::new();
        let sink = CancelAfterFirst(cancel.clone());
        let mut ctx = ctx();

        let err = run_steps("demo", &steps, &registry, &mut ctx, &sink, &cancel).unwrap_err();
        assert!(matches!(err, LiftoffError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
