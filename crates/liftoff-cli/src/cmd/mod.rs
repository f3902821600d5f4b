pub mod check;
pub mod commit;
pub mod domain;
pub mod init;
pub mod preview;
pub mod run;
pub mod runs;
pub mod spec;

use anyhow::Context;
use liftoff_core::config::LiftoffConfig;
use serde_json::{Map, Value};

/// Parse repeated KEY=VALUE arguments. Values that parse as JSON keep their
/// type (numbers, booleans, quoted strings); anything else is a plain string.
pub(crate) fn parse_kv_args(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("expected key=value, got '{pair}'"))?;
        anyhow::ensure!(!key.is_empty(), "expected key=value, got '{pair}'");
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

/// Which spec a bare `liftoff run` should execute.
pub(crate) fn resolve_spec_slug(
    config: &LiftoffConfig,
    explicit: Option<String>,
) -> anyhow::Result<String> {
    explicit
        .or_else(|| config.run.default_spec.clone())
        .context("no spec given and run.default_spec is not set in the config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
