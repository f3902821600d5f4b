//! Readiness evaluation. Checks run concurrently, never short-circuit, and
//! fold into a tiered scorecard.

use crate::context::RunContext;
use crate::registry::Registry;
use crate::spec::{CheckSpec, Severity};
use crate::template;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub passed: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    Ready,
    Almost,
    Incomplete,
}

impl ReadinessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessLevel::Ready => "ready",
            ReadinessLevel::Almost => "almost",
            ReadinessLevel::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scorecard for one spec. `ready` tracks critical checks alone; the level
/// also weighs recommended ones.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub spec: String,
    pub score: u8,
    pub level: ReadinessLevel,
    pub ready: bool,
    pub critical: Vec<CheckResult>,
    pub recommended: Vec<CheckResult>,
    pub optional: Vec<CheckResult>,
    pub generated_at: DateTime<Utc>,
}

impl ReadinessReport {
    pub fn total_checks(&self) -> usize {
        self.critical.len() + self.recommended.len() + self.optional.len()
    }

    pub fn total_passed(&self) -> usize {
        self.critical
            .iter()
            .chain(&self.recommended)
            .chain(&self.optional)
            .filter(|r| r.passed)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate every check against the context. Each check produces exactly one
/// result; executor errors and unknown queries become failed results rather
/// than aborting the evaluation.
pub fn evaluate(
    spec_slug: &str,
    checks: &[CheckSpec],
    registry: &Registry,
    ctx: &RunContext,
) -> ReadinessReport {
    let results: Vec<CheckResult> =
        checks.par_iter().map(|check| run_check(registry, ctx, check)).collect();

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let score = if total == 0 {
        100
    } else {
        ((passed as f64 / total as f64) * 100.0).round() as u8
    };

    let mut critical = Vec::new();
    let mut recommended = Vec::new();
    let mut optional = Vec::new();
    for result in results {
        match result.severity {
            Severity::Critical => critical.push(result),
            Severity::Recommended => recommended.push(result),
            Severity::Optional => optional.push(result),
        }
    }

    let critical_ok = critical.iter().all(|r| r.passed);
    let recommended_ok = recommended.iter().all(|r| r.passed);
    let level = if critical_ok && recommended_ok {
        ReadinessLevel::Ready
    } else if critical_ok {
        ReadinessLevel::Almost
    } else {
        ReadinessLevel::Incomplete
    };

    ReadinessReport {
        spec: spec_slug.to_string(),
        score,
        level,
        ready: critical_ok,
        critical,
        recommended,
        optional,
        generated_at: Utc::now(),
    }
}

fn run_check(registry: &Registry, ctx: &RunContext, check: &CheckSpec) -> CheckResult {
    let finding = match registry.check(&check.query) {
        Some(executor) => executor.call(ctx, check),
        None => Err(format!("no executor registered for '{}'", check.query)),
    };
    let (passed, detail) = match finding {
        Ok(finding) => (finding.passed, finding.detail),
        Err(message) => (false, format!("Check failed: {message}")),
    };
    let fix_action = if passed {
        None
    } else {
        check.fix_action_template.as_deref().map(|tmpl| template::render(tmpl, ctx))
    };
    CheckResult {
        id: check.id.clone(),
        name: check.name.clone(),
        severity: check.severity,
        passed,
        detail,
        fix_action,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
