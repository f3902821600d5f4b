use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Mutable state threaded through a run. Steps read caller input, publish
/// results for later steps, and record warnings for soft failures. Analyze
/// and commit phases both receive the same shape, so a handler cannot tell
/// which phase invoked it.
#[derive(Debug, Clone)]
pub struct RunContext {
    root: PathBuf,
    input: Map<String, Value>,
    results: Map<String, Value>,
    warnings: Vec<String>,
}

impl RunContext {
    pub fn new(root: PathBuf, input: Map<String, Value>) -> Self {
        Self { root, input, results: Map::new(), warnings: Vec::new() }
    }

    /// Rebuild a context from a prior phase: commit runs resume with the
    /// merged preview results and carried warnings already in place.
    pub fn seeded(
        root: PathBuf,
        input: Map<String, Value>,
        results: Map<String, Value>,
        warnings: Vec<String>,
    ) -> Self {
        Self { root, input, results, warnings }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }

    pub fn results(&self) -> &Map<String, Value> {
        &self.results
    }

    pub fn result(&self, key: &str) -> Option<&Value> {
        self.results.get(key)
    }

    pub fn result_str(&self, key: &str) -> Option<&str> {
        self.results.get(key).and_then(Value::as_str)
    }

    pub fn set_result(&mut self, key: impl Into<String>, value: Value) {
        self.results.insert(key.into(), value);
    }

    /// Resolve a key for templates and checks: results take precedence over
    /// input.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.results.get(key).or_else(|| self.input.get(key))
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Map<String, Value>, Vec<String>) {
        (self.results, self.warnings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RunContext {
        let mut input = Map::new();
        input.insert("name".into(), json!("Acme"));
        input.insert("count".into(), json!(2));
        RunContext::new(PathBuf::from("/tmp/x"), input)
    }

    #[test]
    fn lookup_prefers_results_over_input() {
        let mut ctx = ctx();
        assert_eq!(ctx.lookup("name"), Some(&json!("Acme")));
        ctx.set_result("name", json!("Shadowed"));
        assert_eq!(ctx.lookup("name"), Some(&json!("Shadowed")));
        assert_eq!(ctx.input_str("name"), Some("Acme"));
    }

    #[test]
    fn warnings_accumulate_in_order() {
        let mut ctx = ctx();
        ctx.warn("first");
        ctx.warn("second");
        assert_eq!(ctx.warnings(), &["first", "second"]);
    }

    #[test]
    fn seeded_context_carries_prior_state() {
        let mut results = Map::new();
        results.insert("id".into(), json!("acme-1"));
        let ctx = RunContext::seeded(
            PathBuf::from("/tmp/x"),
            Map::new(),
            results,
            vec!["carried".into()],
        );
        assert_eq!(ctx.result_str("id"), Some("acme-1"));
        assert_eq!(ctx.warnings(), &["carried"]);
    }

    #[test]
    fn into_parts_returns_results_and_warnings() {
        let mut ctx = ctx();
        ctx.set_result("done", json!(true));
        ctx.warn("note");
        let (results, warnings) = ctx.into_parts();
        assert_eq!(results.get("done"), Some(&json!(true)));
        assert_eq!(warnings, vec!["note".to_string()]);
    }
}
