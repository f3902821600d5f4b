use crate::context::RunContext;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

static VAR_RE: OnceLock<Regex> = OnceLock::new();

fn var_re() -> &'static Regex {
    VAR_RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z0-9_][A-Za-z0-9_.-]*)\}").expect("template regex is valid")
    })
}

/// Substitute `${key}` placeholders with values from the run context. Step
/// results shadow run input; unknown keys render as the empty string.
pub fn render(template: &str, ctx: &RunContext) -> String {
    var_re()
        .replace_all(template, |caps: &Captures| {
            ctx.lookup(&caps[1]).map(value_text).unwrap_or_default()
        })
        .into_owned()
}

/// Strings render bare; any other JSON value renders in compact JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
