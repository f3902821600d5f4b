use super::domain_slug;
use crate::context::RunContext;
use crate::domain::DomainManifest;
use crate::registry::StepHandler;
use crate::spec::StepSpec;
use serde_json::{json, Value};

/// Attach reference sources to the domain. Entries already present (matched
/// by location) are left alone, so re-running never duplicates them.
pub struct AttachSourcesStep;

impl AttachSourcesStep {
    /// A source entry is either a bare location string or an object with
    /// `location` and an optional `kind` (default "url").
    fn parse_entry(entry: &Value) -> std::result::Result<(String, String), String> {
        match entry {
            Value::String(location) => Ok(("url".to_string(), location.clone())),
            Value::Object(fields) => {
                let location = fields
                    .get("location")
                    .and_then(Value::as_str)
                    .ok_or_else(|| "source entry missing 'location'".to_string())?;
                let kind = fields.get("kind").and_then(Value::as_str).unwrap_or("url");
                Ok((kind.to_string(), location.to_string()))
            }
            _ => Err("source entries must be strings or objects".to_string()),
        }
    }
}

impl StepHandler for AttachSourcesStep {
    fn name(&self) -> &str {
        "source.attach"
    }

    fn description(&self) -> &str {
        "attach reference sources to the domain manifest"
    }

    fn call(&self, ctx: &mut RunContext, step: &StepSpec) -> std::result::Result<(), String> {
        let entries = step
            .args
            .get("sources")
            .and_then(Value::as_array)
            .ok_or_else(|| "missing required arg 'sources'".to_string())?;

        let slug = domain_slug(ctx, &step.args)?;
        let mut manifest = DomainManifest::load(ctx.root(), &slug).map_err(|e| e.to_string())?;

        let mut attached = 0;
        for entry in entries {
            let (kind, location) = Self::parse_entry(entry)?;
            if !manifest.has_source(&location) {
                manifest.add_source(kind, location);
                attached += 1;
            }
        }
        if attached > 0 {
            manifest.save(ctx.root()).map_err(|e| e.to_string())?;
        }

        ctx.set_result("sources_attached", json!(attached));
        ctx.set_result("sources_total", json!(manifest.sources.len()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn step(args: Value) -> StepSpec {
        StepSpec {
            id: "s".into(),
            name: "Attach".into(),
            operation: "source.attach".into(),
            order: 0,
            on_error: Default::default(),
            progress_message: None,
            phase: Default::default(),
            args: args.as_object().cloned().unwrap_or_default(),
        }
    }

    fn ctx_with_domain(dir: &TempDir) -> RunContext {
        let (_, _) = DomainManifest::find_or_create(dir.path(), "acme", "Acme").unwrap();
        let mut ctx = RunContext::new(dir.path().to_path_buf(), serde_json::Map::new());
        ctx.set_result("domain", json!("acme"));
        ctx
    }

    #[test]
    fn attaches_strings_and_objects() {
        let dir = TempDir::new().unwrap();
        let mut ctx = ctx_with_domain(&dir);
        let args = json!({
            "sources": [
                "https://example.com/guide",
                { "kind": "file", "location": "./notes.md" }
            ]
        });
        AttachSourcesStep.call(&mut ctx, &step(args)).unwrap();
        assert_eq!(ctx.result("sources_attached"), Some(&json!(2)));

        let manifest = DomainManifest::load(dir.path(), "acme").unwrap();
        assert_eq!(manifest.sources[0].kind, "url");
        assert_eq!(manifest.sources[1].kind, "file");
    }

    #[test]
    fn re_running_skips_known_locations() {
        let dir = TempDir::new().unwrap();
        let mut ctx = ctx_with_domain(&dir);
        let args = json!({ "sources": ["https://example.com/a"] });
        AttachSourcesStep.call(&mut ctx, &step(args.clone())).unwrap();
        AttachSourcesStep.call(&mut ctx, &step(args)).unwrap();

        assert_eq!(ctx.result("sources_attached"), Some(&json!(0)));
        assert_eq!(ctx.result("sources_total"), Some(&json!(1)));
    }

    #[test]
    fn entry_without_location_fails() {
        let dir = TempDir::new().unwrap();
        let mut ctx = ctx_with_domain(&dir);
        let err = AttachSourcesStep
            .call(&mut ctx, &step(json!({ "sources": [{ "kind": "url" }] })))
            .unwrap_err();
        assert!(err.contains("missing 'location'"));
    }
}
