use super::{domain_slug, required_str};
use crate::context::RunContext;
use crate::domain::DomainManifest;
use crate::registry::StepHandler;
use crate::spec::StepSpec;
use crate::template;
use serde_json::json;

/// Record a notice on the domain manifest. The message is rendered through
/// the run context and deduplicated against notices already present.
pub struct RecordNoticeStep;

impl StepHandler for RecordNoticeStep {
    fn name(&self) -> &str {
        "notify.record"
    }

    fn description(&self) -> &str {
        "record a rendered notice on the domain manifest"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        let template_text = required_str(&step.args, "message")?;
        let slug = domain_slug(ctx, &step.args)?;
        let message = template::render(template_text, ctx);

        let mut manifest = DomainManifest::load(ctx.root(), &slug).map_err(|e| e.to_string())?;
        if !manifest.has_notice(&message) {
            manifest.add_notice(message);
            manifest.save(ctx.root()).map_err(|e| e.to_string())?;
        }

        ctx.set_result("notified", json!(true));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
