use crate::output;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::spec::{list_specs, SetupSpec};
use std::path::Path;

pub fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let spec = SetupSpec::import(root, file)?;

    if json {
        #[derive(serde::Serialize)]
        struct ImportOutput {
            slug: String,
            version: u32,
            steps: usize,
            checks: usize,
        }
        return output::print_json(&ImportOutput {
            slug: spec.slug.clone(),
            version: spec.version,
            steps: spec.steps.len(),
            checks: spec.checks.len(),
        });
    }
    println!(
        "imported '{}' version {} ({} steps, {} checks)",
        spec.slug,
        spec.version,
        spec.steps.len(),
        spec.checks.len()
    );
    Ok(())
}

pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let specs = list_specs(root)?;

    if json {
        return output::print_json(&specs);
    }
    if specs.is_empty() {
        println!("no specs stored (import one with `liftoff spec import <file>`)");
        return Ok(());
    }
    println!("{:<20} {:>7} {:>6} {:>7}  name", "slug", "version", "steps", "checks");
    for spec in specs {
        println!(
            "{:<20} {:>7} {:>6} {:>7}  {}",
            spec.slug, spec.version, spec.steps, spec.checks, spec.name
        );
    }
    Ok(())
}

pub fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let spec = SetupSpec::load(root, slug)?;

    if json {
        return output::print_json(&spec);
    }
    println!("{} ({})", spec.name, spec.slug);
    if let Some(description) = &spec.description {
        println!("{description}");
    }
    output::print_kv("version", spec.version);

    println!();
    println!("steps:");
    for step in &spec.steps {
        println!(
            "  {:>4}  {:<24} {:<20} {:<8} {}",
            step.order,
            step.id,
            step.operation,
            step.phase.as_str(),
            step.on_error.as_str()
        );
    }
    if !spec.checks.is_empty() {
        println!();
        println!("checks:");
        for check in &spec.checks {
            println!(
                "  {:<12} {:<24} {}",
                check.severity.as_str(),
                check.id,
                check.query
            );
        }
    }
    Ok(())
}
