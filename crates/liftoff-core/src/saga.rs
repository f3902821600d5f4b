//! Two-phase runs. Analyze executes the read-only half of a spec and
//! captures a preview; commit resumes from that preview, with caller
//! overrides folded in, and executes the rest.

use crate::context::RunContext;
use crate::runner::StepTally;
use crate::spec::{SetupSpec, SpecPhase, StepSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub steps_analyzed: usize,
    pub steps_skipped: usize,
    pub steps_remaining: usize,
}

/// Everything the analyze phase learned, in a form the caller can inspect,
/// edit, and hand back to commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preview {
    pub spec: String,
    pub version: u32,
    pub input: Map<String, Value>,
    pub results: Map<String, Value>,
    pub warnings: Vec<String>,
    pub summary: PreviewSummary,
    pub generated_at: DateTime<Utc>,
}

pub(crate) fn build_preview(spec: &SetupSpec, ctx: RunContext, tally: &StepTally) -> Preview {
    let steps_remaining = phase_steps(spec, SpecPhase::Commit).len();
    let input = ctx.input().clone();
    let (results, warnings) = ctx.into_parts();
    Preview {
        spec: spec.slug.clone(),
        version: spec.version,
        input,
        results,
        warnings,
        summary: PreviewSummary {
            steps_analyzed: tally.run,
            steps_skipped: tally.skipped,
            steps_remaining,
        },
        generated_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Merging and phase selection
// ---------------------------------------------------------------------------

/// Fold caller overrides onto preview results. The merge is shallow and
/// key-level: an override value replaces the preview value wholesale, nested
/// objects are never merged recursively.
pub fn merge_overrides(results: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = results.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// The subset of a spec's steps belonging to one phase, in execution order.
pub(crate) fn phase_steps(spec: &SetupSpec, phase: SpecPhase) -> Vec<StepSpec> {
    spec.steps.iter().filter(|s| s.phase == phase).cloned().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
