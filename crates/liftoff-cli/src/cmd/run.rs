use crate::cmd::{parse_kv_args, resolve_spec_slug};
use crate::output;
use chrono::Utc;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::context::RunContext;
use liftoff_core::engine::Engine;
use liftoff_core::progress::{NullSink, ProgressEvent, ProgressKind, ProgressSink};
use liftoff_core::runlog::{self, RunKind, RunRecord};
use liftoff_core::runner::CancelFlag;
use std::path::Path;

/// Renders progress events as indented console lines.
pub(crate) struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: &ProgressEvent) {
        match event.kind {
            ProgressKind::Started => {
                println!("[{}/{}] {}", event.step_index + 1, event.total_steps, event.message)
            }
            ProgressKind::Completed => println!("      {}", event.message),
            ProgressKind::Skipped => println!("      skipped: {}", event.message),
            ProgressKind::Failed => println!("      failed: {}", event.message),
        }
    }
}

/// JSON mode keeps stdout parseable, so progress stays silent there.
pub(crate) fn sink_for(quiet: bool) -> Box<dyn ProgressSink> {
    if quiet {
        Box::new(NullSink)
    } else {
        Box::new(ConsoleSink)
    }
}

pub fn run(
    root: &Path,
    slug: Option<String>,
    input: &[String],
    check: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = LiftoffConfig::load(root)?;
    let slug = resolve_spec_slug(&config, slug)?;
    let input = parse_kv_args(input)?;

    let engine = Engine::builtin();
    let sink = sink_for(json);
    let started_at = Utc::now();

    let outcome =
        match engine.run_all(root, &slug, input.clone(), sink.as_ref(), &CancelFlag::new()) {
            Ok(outcome) => outcome,
            Err(e) => {
                RunRecord::from_failure(RunKind::Run, &slug, started_at, &e.to_string())
                    .save(root)?;
                return Err(e.into());
            }
        };

    RunRecord::from_outcome(RunKind::Run, &outcome).save(root)?;
    runlog::enforce_retention(root, config.run.keep_runs)?;

    let report = if check {
        let ctx = RunContext::seeded(
            root.to_path_buf(),
            input,
            outcome.results.clone(),
            Vec::new(),
        );
        Some(engine.evaluate(&slug, &ctx)?)
    } else {
        None
    };

    if json {
        match &report {
            Some(report) => output::print_json(&serde_json::json!({
                "outcome": outcome,
                "report": report,
            }))?,
            None => output::print_json(&outcome)?,
        }
        return Ok(());
    }

    println!();
    println!(
        "done: {} steps run, {} skipped ({} ms)",
        outcome.steps_run, outcome.steps_skipped, outcome.duration_ms
    );
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
    if let Some(report) = &report {
        println!();
        super::check::render_report(report, false)?;
    }
    Ok(())
}
