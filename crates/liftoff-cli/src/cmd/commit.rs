use crate::cmd::parse_kv_args;
use crate::output;
use anyhow::Context;
use chrono::Utc;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::engine::Engine;
use liftoff_core::runlog::{self, RunKind, RunRecord};
use liftoff_core::runner::CancelFlag;
use liftoff_core::saga::Preview;
use std::fs;
use std::path::Path;

pub fn run(
    root: &Path,
    slug: &str,
    preview_path: &Path,
    set: &[String],
    input: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let config = LiftoffConfig::load(root)?;
    let raw = fs::read_to_string(preview_path)
        .with_context(|| format!("cannot read preview file '{}'", preview_path.display()))?;
    let preview: Preview = serde_yaml::from_str(&raw)
        .with_context(|| format!("'{}' is not a valid preview", preview_path.display()))?;

    let overrides = parse_kv_args(set)?;
    let mut input = parse_kv_args(input)?;
    // A bare commit resumes with the input the preview was taken with.
    if input.is_empty() {
        input = preview.input.clone();
    }

    let engine = Engine::builtin();
    let sink = super::run::sink_for(json);
    let started_at = Utc::now();

    let outcome = match engine.commit(
        root,
        slug,
        &preview,
        &overrides,
        input,
        sink.as_ref(),
        &CancelFlag::new(),
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            RunRecord::from_failure(RunKind::Commit, slug, started_at, &e.to_string())
                .save(root)?;
            return Err(e.into());
        }
    };

    RunRecord::from_outcome(RunKind::Commit, &outcome).save(root)?;
    runlog::enforce_retention(root, config.run.keep_runs)?;

    if json {
        return output::print_json(&outcome);
    }
    println!();
    println!(
        "committed: {} steps run, {} skipped ({} ms)",
        outcome.steps_run, outcome.steps_skipped, outcome.duration_ms
    );
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}
