use crate::output;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::runlog;
use std::path::Path;

pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let records = runlog::list_runs(root)?;

    if json {
        return output::print_json(&records);
    }
    if records.is_empty() {
        println!("no runs recorded");
        return Ok(());
    }
    println!("{:<24} {:<8} {:<10} {:<16} detail", "id", "kind", "status", "spec");
    for record in records {
        let detail = match (record.score, &record.error) {
            (Some(score), _) => format!("score {score}"),
            (None, Some(error)) => error.clone(),
            (None, None) => {
                format!("{} run, {} skipped", record.steps_run, record.steps_skipped)
            }
        };
        println!(
            "{:<24} {:<8} {:<10} {:<16} {}",
            record.id,
            record.kind.as_str(),
            record.status.as_str(),
            record.spec,
            detail
        );
    }
    Ok(())
}

pub fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let record = runlog::load_run(root, id)?;

    if json {
        return output::print_json(&record);
    }
    output::print_kv("id", &record.id);
    output::print_kv("spec", &record.spec);
    output::print_kv("kind", record.kind);
    output::print_kv("status", record.status);
    output::print_kv("started", record.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    output::print_kv("duration", format!("{} ms", record.duration_ms));
    output::print_kv(
        "steps",
        format!("{} run, {} skipped", record.steps_run, record.steps_skipped),
    );
    if let Some(score) = record.score {
        output::print_kv("score", score);
    }
    if let Some(ready) = record.ready {
        output::print_kv("ready", if ready { "yes" } else { "no" });
    }
    if let Some(error) = &record.error {
        output::print_kv("error", error);
    }
    for warning in &record.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}
