use crate::context::RunContext;
use crate::registry::StepHandler;
use crate::spec::StepSpec;

/// Copy every step arg into the run results verbatim. Useful for fixing
/// values later steps or checks will read.
pub struct SetValuesStep;

impl StepHandler for SetValuesStep {
    fn name(&self) -> &str {
        "context.set"
    }

    fn description(&self) -> &str {
        "publish step args as run results"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        for (key, value) in &step.args {
            ctx.set_result(key.as_str(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn publishes_args_as_results() {
        let mut ctx = RunContext::new(PathBuf::from("/tmp/x"), serde_json::Map::new());
        let step = StepSpec {
            id: "s".into(),
            name: "Set".into(),
            operation: "context.set".into(),
            order: 0,
            on_error: Default::default(),
            progress_message: None,
            phase: Default::default(),
            args: json!({ "tier": "starter", "count": 3 }).as_object().cloned().unwrap(),
        };
        SetValuesStep.call(&mut ctx, &step).unwrap();
        assert_eq!(ctx.result("tier"), Some(&json!("starter")));
        assert_eq!(ctx.result("count"), Some(&json!(3)));
    }
}
