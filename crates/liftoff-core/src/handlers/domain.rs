use super::{arg_str, domain_slug};
use crate::context::RunContext;
use crate::domain::DomainManifest;
use crate::paths::slugify;
use crate::registry::StepHandler;
use crate::spec::StepSpec;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// domain.create
// ---------------------------------------------------------------------------

/// Find or create the domain workspace. The slug comes from `args.slug` when
/// given, otherwise it is derived from the display name; repeated runs
/// converge on the same workspace.
pub struct CreateDomainStep;

impl StepHandler for CreateDomainStep {
    fn name(&self) -> &str {
        "domain.create"
    }

    fn description(&self) -> &str {
        "find or create a domain workspace keyed by slug"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        let name = arg_str(&step.args, "name")
            .or_else(|| ctx.input_str("name"))
            .map(str::to_string);
        let slug = match arg_str(&step.args, "slug") {
            Some(slug) => slug.to_string(),
            None => match &name {
                Some(name) => slugify(name),
                None => {
                    return Err(
                        "missing domain name (pass input name=... or set args.slug)".to_string()
                    )
                }
            },
        };
        let display = name.unwrap_or_else(|| slug.clone());

        let (manifest, created) = DomainManifest::find_or_create(ctx.root(), &slug, &display)
            .map_err(|e| e.to_string())?;
        let path = crate::paths::domain_dir(ctx.root(), &slug);

        ctx.set_result("domain", json!(manifest.slug));
        ctx.set_result("domain_path", json!(path.display().to_string()));
        ctx.set_result("name", json!(manifest.name));
        ctx.set_result("created", json!(created));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// domain.seed_goals
// ---------------------------------------------------------------------------

/// Add the goals listed in `args.goals` to the domain, skipping titles it
/// already has.
pub struct SeedGoalsStep;

impl StepHandler for SeedGoalsStep {
    fn name(&self) -> &str {
        "domain.seed_goals"
    }

    fn description(&self) -> &str {
        "seed missing goals into the domain manifest"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        let titles = step
            .args
            .get("goals")
            .and_then(Value::as_array)
            .ok_or_else(|| "missing required arg 'goals'".to_string())?;

        let slug = domain_slug(ctx, &step.args)?;
        let mut manifest = DomainManifest::load(ctx.root(), &slug).map_err(|e| e.to_string())?;

        let mut seeded = 0;
        for title in titles {
            let Some(title) = title.as_str() else {
                return Err("args.goals must be a list of strings".to_string());
            };
            if !manifest.has_goal(title) {
                manifest.add_goal(title);
                seeded += 1;
            }
        }
        if seeded > 0 {
            manifest.save(ctx.root()).map_err(|e| e.to_string())?;
        }

        ctx.set_result("goals_seeded", json!(seeded));
        ctx.set_result("goals_total", json!(manifest.goals.len()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
