use super::{domain_slug, required_str};
use crate::context::RunContext;
use crate::io::atomic_write;
use crate::paths::{domain_prompts_dir, validate_slug};
use crate::registry::StepHandler;
use crate::spec::StepSpec;
use crate::template;
use serde_json::json;

/// Render an `args.template` through the run context and write it to
/// `prompts/<target>.md` inside the domain workspace.
pub struct RenderPromptStep;

impl StepHandler for RenderPromptStep {
    fn name(&self) -> &str {
        "prompt.render"
    }

    fn description(&self) -> &str {
        "render a prompt template into the domain workspace"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        let target = required_str(&step.args, "target")?;
        // Targets become file names; holding them to slug rules keeps writes
        // inside the prompts directory.
        validate_slug(target).map_err(|e| e.to_string())?;
        let template_text = required_str(&step.args, "template")?;
        let slug = domain_slug(ctx, &step.args)?;

        let rendered = template::render(template_text, ctx);
        let path = domain_prompts_dir(ctx.root(), &slug).join(format!("{target}.md"));
        atomic_write(&path, &rendered).map_err(|e| e.to_string())?;

        ctx.set_result("prompt_path", json!(path.display().to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
