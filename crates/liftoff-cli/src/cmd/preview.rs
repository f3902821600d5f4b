use crate::cmd::parse_kv_args;
use crate::output;
use chrono::Utc;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::engine::Engine;
use liftoff_core::io::atomic_write;
use liftoff_core::runlog::{self, RunKind, RunRecord};
use liftoff_core::runner::CancelFlag;
use std::path::Path;

pub fn run(
    root: &Path,
    slug: &str,
    input: &[String],
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = LiftoffConfig::load(root)?;
    let input = parse_kv_args(input)?;

    let engine = Engine::builtin();
    // With the preview going to stdout, progress lines would corrupt it.
    let sink = super::run::sink_for(json || out.is_none());
    let started_at = Utc::now();

    let preview = match engine.analyze(root, slug, input, sink.as_ref(), &CancelFlag::new()) {
        Ok(preview) => preview,
        Err(e) => {
            RunRecord::from_failure(RunKind::Analyze, slug, started_at, &e.to_string())
                .save(root)?;
            return Err(e.into());
        }
    };

    RunRecord::from_preview(&preview, started_at).save(root)?;
    runlog::enforce_retention(root, config.run.keep_runs)?;

    if json {
        return output::print_json(&preview);
    }
    let yaml = serde_yaml::to_string(&preview)?;
    match out {
        Some(path) => {
            atomic_write(path, &yaml)?;
            println!("preview written to {}", path.display());
            println!(
                "apply it with: liftoff commit {slug} --preview {}",
                path.display()
            );
        }
        None => print!("{yaml}"),
    }
    Ok(())
}
