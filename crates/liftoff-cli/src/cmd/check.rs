use crate::cmd::parse_kv_args;
use crate::output;
use chrono::Utc;
use liftoff_core::checks::ReadinessReport;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::context::RunContext;
use liftoff_core::domain::DomainManifest;
use liftoff_core::engine::Engine;
use liftoff_core::paths;
use liftoff_core::runlog::{self, RunRecord};
use serde_json::json;
use std::path::Path;

pub fn run(
    root: &Path,
    slug: &str,
    domain: Option<&str>,
    input: &[String],
    strict: bool,
    json_mode: bool,
) -> anyhow::Result<()> {
    let config = LiftoffConfig::load(root)?;
    let input = parse_kv_args(input)?;

    let mut ctx = RunContext::new(root.to_path_buf(), input);
    if let Some(domain_slug) = domain {
        let manifest = DomainManifest::load(root, domain_slug)?;
        ctx.set_result("domain", json!(manifest.slug));
        ctx.set_result(
            "domain_path",
            json!(paths::domain_dir(root, &manifest.slug).display().to_string()),
        );
        ctx.set_result("name", json!(manifest.name));
    }

    let started_at = Utc::now();
    let engine = Engine::builtin();
    let report = engine.evaluate(slug, &ctx)?;
    RunRecord::from_report(&report, started_at).save(root)?;
    runlog::enforce_retention(root, config.run.keep_runs)?;

    render_report(&report, json_mode)?;
    if strict && !report.ready {
        std::process::exit(2);
    }
    Ok(())
}

pub(crate) fn render_report(report: &ReadinessReport, json_mode: bool) -> anyhow::Result<()> {
    if json_mode {
        return output::print_json(report);
    }
    println!("{} readiness: {}% ({})", report.spec, report.score, report.level);
    for (tier, results) in [
        ("critical", &report.critical),
        ("recommended", &report.recommended),
        ("optional", &report.optional),
    ] {
        if results.is_empty() {
            continue;
        }
        println!();
        println!("{tier}:");
        for result in results {
            println!("  {} {}: {}", output::mark(result.passed), result.name, result.detail);
            if let Some(fix) = &result.fix_action {
                println!("    fix: {fix}");
            }
        }
    }
    println!();
    println!("ready: {}", if report.ready { "yes" } else { "no" });
    Ok(())
}
