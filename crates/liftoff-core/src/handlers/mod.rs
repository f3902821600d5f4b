//! Built-in operations and check executors. Each handler is a small struct
//! registered by name; specs reach them only through the registry.

pub mod checks;
pub mod domain;
pub mod notify;
pub mod prompt;
pub mod source;
pub mod value;

use crate::context::RunContext;
use crate::registry::Registry;
use serde_json::{Map, Value};

pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_step(Box::new(domain::CreateDomainStep));
    registry.register_step(Box::new(domain::SeedGoalsStep));
    registry.register_step(Box::new(source::AttachSourcesStep));
    registry.register_step(Box::new(prompt::RenderPromptStep));
    registry.register_step(Box::new(notify::RecordNoticeStep));
    registry.register_step(Box::new(value::SetValuesStep));

    registry.register_check(Box::new(checks::ManifestExistsCheck));
    registry.register_check(Box::new(checks::ManifestFieldCheck));
    registry.register_check(Box::new(checks::GoalsMinCountCheck));
    registry.register_check(Box::new(checks::SourcesPresentCheck));
    registry.register_check(Box::new(checks::PathExistsCheck));
    registry.register_check(Box::new(checks::ResultPresentCheck));
    registry
}

// ---------------------------------------------------------------------------
// Shared argument helpers
// ---------------------------------------------------------------------------

pub(crate) fn arg_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub(crate) fn required_str<'a>(
    args: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a str, String> {
    arg_str(args, key).ok_or_else(|| format!("missing required arg '{key}'"))
}

/// Resolve which domain a handler should act on: an explicit `domain` arg
/// wins, otherwise the slug a previous step published into the context.
pub(crate) fn domain_slug(
    ctx: &RunContext,
    args: &Map<String, Value>,
) -> std::result::Result<String, String> {
    if let Some(slug) = arg_str(args, "domain") {
        return Ok(slug.to_string());
    }
    if let Some(slug) = ctx.lookup("domain").and_then(Value::as_str) {
        return Ok(slug.to_string());
    }
    Err("no domain in scope (set args.domain or run domain.create first)".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
