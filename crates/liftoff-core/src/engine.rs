//! Entry points. The engine owns a handler registry and exposes the four
//! ways to exercise a spec: run it whole, analyze, commit, and evaluate
//! readiness.

use crate::checks::{self, ReadinessReport};
use crate::context::RunContext;
use crate::error::{LiftoffError, Result};
use crate::progress::ProgressSink;
use crate::registry::Registry;
use crate::runner::{run_steps, CancelFlag, RunOutcome, StepTally};
use crate::saga::{self, Preview};
use crate::spec::{SetupSpec, SpecPhase};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::path::Path;

pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Engine with the built-in handlers registered.
    pub fn builtin() -> Self {
        Self::new(Registry::builtin())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Execute every step of a spec in one pass, both phases included.
    pub fn run_all(
        &self,
        root: &Path,
        slug: &str,
        input: Map<String, Value>,
        sink: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<RunOutcome> {
        let started_at = Utc::now();
        let spec = SetupSpec::load(root, slug)?;
        let mut ctx = RunContext::new(root.to_path_buf(), input);
        let tally = run_steps(&spec.slug, &spec.steps, &self.registry, &mut ctx, sink, cancel)?;
        Ok(outcome(&spec, ctx, &tally, started_at))
    }

    /// Run the analyze phase and capture a preview for later commit.
    pub fn analyze(
        &self,
        root: &Path,
        slug: &str,
        input: Map<String, Value>,
        sink: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<Preview> {
        let spec = SetupSpec::load(root, slug)?;
        let steps = saga::phase_steps(&spec, SpecPhase::Analyze);
        let mut ctx = RunContext::new(root.to_path_buf(), input);
        let tally = run_steps(&spec.slug, &steps, &self.registry, &mut ctx, sink, cancel)?;
        Ok(saga::build_preview(&spec, ctx, &tally))
    }

    /// Resume from a preview and run the commit phase. Caller overrides are
    /// folded onto the preview results before any step executes; commit
    /// steps see the merged values exactly as analyze steps left them.
    pub fn commit(
        &self,
        root: &Path,
        slug: &str,
        preview: &Preview,
        overrides: &Map<String, Value>,
        input: Map<String, Value>,
        sink: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<RunOutcome> {
        let started_at = Utc::now();
        let spec = SetupSpec::load(root, slug)?;
        if preview.spec != spec.slug {
            return Err(LiftoffError::PreviewMismatch {
                expected: spec.slug.clone(),
                found: preview.spec.clone(),
            });
        }
        if preview.version != spec.version {
            tracing::warn!(
                preview = preview.version,
                spec = spec.version,
                "preview was generated against a different spec version"
            );
        }
        let merged = saga::merge_overrides(&preview.results, overrides);
        let mut ctx =
            RunContext::seeded(root.to_path_buf(), input, merged, preview.warnings.clone());
        let steps = saga::phase_steps(&spec, SpecPhase::Commit);
        let tally = run_steps(&spec.slug, &steps, &self.registry, &mut ctx, sink, cancel)?;
        Ok(outcome(&spec, ctx, &tally, started_at))
    }

    /// Evaluate a spec's readiness checks against a prepared context.
    pub fn evaluate(&self, slug: &str, ctx: &RunContext) -> Result<ReadinessReport> {
        let spec = SetupSpec::load(ctx.root(), slug)?;
        Ok(checks::evaluate(&spec.slug, &spec.checks, &self.registry, ctx))
    }
}

fn outcome(
    spec: &SetupSpec,
    ctx: RunContext,
    tally: &StepTally,
    started_at: DateTime<Utc>,
) -> RunOutcome {
    let (results, warnings) = ctx.into_parts();
    RunOutcome {
        spec: spec.slug.clone(),
        steps_run: tally.run,
        steps_skipped: tally.skipped,
        results,
        warnings,
        started_at,
        duration_ms: (Utc::now() - started_at).num_milliseconds().max(0) as u64,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
