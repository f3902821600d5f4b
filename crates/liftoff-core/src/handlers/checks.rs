//! Built-in check executors. All of them are read-only observations of the
//! workspace or the run context.

use super::{domain_slug, required_str};
use crate::context::RunContext;
use crate::domain::DomainManifest;
use crate::registry::{CheckExecutor, CheckFinding};
use crate::spec::CheckSpec;
use crate::template;
use serde_json::{Map, Value};
use std::path::PathBuf;

fn load_manifest(
    ctx: &RunContext,
    args: &Map<String, Value>,
) -> std::result::Result<DomainManifest, String> {
    let slug = domain_slug(ctx, args)?;
    DomainManifest::load(ctx.root(), &slug).map_err(|e| e.to_string())
}

fn arg_u64(args: &Map<String, Value>, key: &str, default: u64) -> u64 {
    args.get(key).and_then(Value::as_u64).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// manifest.exists
// ---------------------------------------------------------------------------

pub struct ManifestExistsCheck;

impl CheckExecutor for ManifestExistsCheck {
    fn name(&self) -> &str {
        "manifest.exists"
    }

    fn description(&self) -> &str {
        "the domain workspace has a manifest"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        let slug = domain_slug(ctx, &check.args)?;
        if DomainManifest::exists(ctx.root(), &slug) {
            Ok(CheckFinding::pass(format!("domain '{slug}' is provisioned")))
        } else {
            Ok(CheckFinding::fail(format!("domain '{slug}' has no manifest")))
        }
    }
}

// ---------------------------------------------------------------------------
// manifest.field
// ---------------------------------------------------------------------------

/// Inspect one top-level manifest field. With `args.equals` the field must
/// match exactly; without it the field must be present and non-empty.
pub struct ManifestFieldCheck;

impl CheckExecutor for ManifestFieldCheck {
    fn name(&self) -> &str {
        "manifest.field"
    }

    fn description(&self) -> &str {
        "a manifest field is set, or equals an expected value"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        let field = required_str(&check.args, "field")?;
        let manifest = load_manifest(ctx, &check.args)?;
        let doc = serde_json::to_value(&manifest).map_err(|e| e.to_string())?;
        let found = doc.get(field).cloned().unwrap_or(Value::Null);

        if let Some(want) = check.args.get("equals") {
            return Ok(if &found == want {
                CheckFinding::pass(format!("{field} = {found}"))
            } else {
                CheckFinding::fail(format!("{field} = {found}, expected {want}"))
            });
        }
        let present = match &found {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        };
        Ok(if present {
            CheckFinding::pass(format!("{field} is set"))
        } else {
            CheckFinding::fail(format!("{field} is not set"))
        })
    }
}

// ---------------------------------------------------------------------------
// goals.min_count / sources.present
// ---------------------------------------------------------------------------

pub struct GoalsMinCountCheck;

impl CheckExecutor for GoalsMinCountCheck {
    fn name(&self) -> &str {
        "goals.min_count"
    }

    fn description(&self) -> &str {
        "the domain has at least args.min goals"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        let min = arg_u64(&check.args, "min", 1);
        let manifest = load_manifest(ctx, &check.args)?;
        let count = manifest.goals.len() as u64;
        let detail = format!("{count} goals (need {min})");
        Ok(if count >= min { CheckFinding::pass(detail) } else { CheckFinding::fail(detail) })
    }
}

pub struct SourcesPresentCheck;

impl CheckExecutor for SourcesPresentCheck {
    fn name(&self) -> &str {
        "sources.present"
    }

    fn description(&self) -> &str {
        "the domain has at least args.min sources attached"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        let min = arg_u64(&check.args, "min", 1);
        let manifest = load_manifest(ctx, &check.args)?;
        let count = manifest.sources.len() as u64;
        let detail = format!("{count} sources (need {min})");
        Ok(if count >= min { CheckFinding::pass(detail) } else { CheckFinding::fail(detail) })
    }
}

// ---------------------------------------------------------------------------
// path.exists
// ---------------------------------------------------------------------------

/// Check a filesystem path after template rendering. Relative paths resolve
/// against the workspace root.
pub struct PathExistsCheck;

impl CheckExecutor for PathExistsCheck {
    fn name(&self) -> &str {
        "path.exists"
    }

    fn description(&self) -> &str {
        "a rendered path exists on disk"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        let raw = required_str(&check.args, "path")?;
        let rendered = template::render(raw, ctx);
        if rendered.trim().is_empty() {
            return Err(format!("path template '{raw}' rendered empty"));
        }
        let path = PathBuf::from(&rendered);
        let path = if path.is_absolute() { path } else { ctx.root().join(path) };
        Ok(if path.exists() {
            CheckFinding::pass(format!("exists: {}", path.display()))
        } else {
            CheckFinding::fail(format!("missing: {}", path.display()))
        })
    }
}

// ---------------------------------------------------------------------------
// result.present
// ---------------------------------------------------------------------------

pub struct ResultPresentCheck;

impl CheckExecutor for ResultPresentCheck {
    fn name(&self) -> &str {
        "result.present"
    }

    fn description(&self) -> &str {
        "a step published the named result key"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        let key = required_str(&check.args, "key")?;
        Ok(if ctx.result(key).is_some() {
            CheckFinding::pass(format!("'{key}' present in results"))
        } else {
            CheckFinding::fail(format!("'{key}' not produced by any step"))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
