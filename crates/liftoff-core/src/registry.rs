//! Handler registry. Operations and check queries resolve here by exact
//! name; registration is always explicit.

use crate::context::RunContext;
use crate::spec::{CheckSpec, StepSpec};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Handler seams
// ---------------------------------------------------------------------------

/// Outcome of one readiness check executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFinding {
    pub passed: bool,
    pub detail: String,
}

impl CheckFinding {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self { passed: true, detail: detail.into() }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self { passed: false, detail: detail.into() }
    }
}

/// A provisioning operation. Handlers signal failure through the error
/// string; the runner decides what a failure means from the step's policy.
pub trait StepHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String>;
}

/// A readiness check executor. Errors are converted to failed findings by
/// the check engine, never propagated.
pub trait CheckExecutor: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn call(&self, ctx: &RunContext, check: &CheckSpec)
        -> std::result::Result<CheckFinding, String>;
}

// ---------------------------------------------------------------------------
// Closure adapters
// ---------------------------------------------------------------------------

type StepFn = Box<dyn Fn(&mut RunContext, &StepSpec) -> std::result::Result<(), String> + Send + Sync>;
type CheckFn =
    Box<dyn Fn(&RunContext, &CheckSpec) -> std::result::Result<CheckFinding, String> + Send + Sync>;

pub struct FnStep {
    name: String,
    f: StepFn,
}

impl FnStep {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&mut RunContext, &StepSpec) -> std::result::Result<(), String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self { name: name.into(), f: Box::new(f) }
    }
}

impl StepHandler for FnStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "ad-hoc step handler"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        (self.f)(ctx, step)
    }
}

pub struct FnCheck {
    name: String,
    f: CheckFn,
}

impl FnCheck {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&RunContext, &CheckSpec) -> std::result::Result<CheckFinding, String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self { name: name.into(), f: Box::new(f) }
    }
}

impl CheckExecutor for FnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "ad-hoc check executor"
    }

    fn call(
        &self,
        ctx: &RunContext,
        check: &CheckSpec,
    ) -> std::result::Result<CheckFinding, String> {
        (self.f)(ctx, check)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Registry {
    steps: HashMap<String, Box<dyn StepHandler>>,
    checks: HashMap<String, Box<dyn CheckExecutor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in operation and check executor installed.
    pub fn builtin() -> Self {
        crate::handlers::builtin_registry()
    }

    pub fn register_step(&mut self, handler: Box<dyn StepHandler>) {
        self.steps.insert(handler.name().to_string(), handler);
    }

    pub fn register_check(&mut self, executor: Box<dyn CheckExecutor>) {
        self.checks.insert(executor.name().to_string(), executor);
    }

    pub fn step(&self, operation: &str) -> Option<&dyn StepHandler> {
        self.steps.get(operation).map(|h| h.as_ref())
    }

    pub fn check(&self, query: &str) -> Option<&dyn CheckExecutor> {
        self.checks.get(query).map(|h| h.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn step_spec(operation: &str) -> StepSpec {
        serde_yaml::from_str(&format!(
            "id: s1\nname: Step one\noperation: {operation}\n"
        ))
        .unwrap()
    }

    fn check_spec(query: &str) -> CheckSpec {
        serde_yaml::from_str(&format!("id: c1\nname: Check one\nquery: {query}\n")).unwrap()
    }

    #[test]
    fn registered_step_resolves_and_runs() {
        let mut registry = Registry::new();
        registry.register_step(Box::new(FnStep::new("touch", |ctx, _step| {
            ctx.set_result("touched", json!(true));
            Ok(())
        })));

        let mut ctx = RunContext::new(PathBuf::from("/tmp/x"), serde_json::Map::new());
        let handler = registry.step("touch").unwrap();
        handler.call(&mut ctx, &step_spec("touch")).unwrap();
        assert_eq!(ctx.result("touched"), Some(&json!(true)));
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        let registry = Registry::new();
        assert!(registry.step("nope").is_none());
        assert!(registry.check("nope").is_none());
    }

    #[test]
    fn check_executor_returns_finding() {
        let mut registry = Registry::new();
        registry.register_check(Box::new(FnCheck::new("always.pass", |_ctx, _check| {
            Ok(CheckFinding::pass("fine"))
        })));

        let ctx = RunContext::new(PathBuf::from("/tmp/x"), serde_json::Map::new());
        let finding = registry
            .check("always.pass")
            .unwrap()
            .call(&ctx, &check_spec("always.pass"))
            .unwrap();
        assert!(finding.passed);
        assert_eq!(finding.detail, "fine");
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = Registry::new();
        registry.register_step(Box::new(FnStep::new("op", |_, _| Err("old".into()))));
        registry.register_step(Box::new(FnStep::new("op", |_, _| Ok(()))));

        let mut ctx = RunContext::new(PathBuf::from("/tmp/x"), serde_json::Map::new());
        assert!(registry.step("op").unwrap().call(&mut ctx, &step_spec("op")).is_ok());
    }
}
