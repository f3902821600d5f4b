use crate::output;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::domain::DomainManifest;
use std::path::Path;

pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let domains = DomainManifest::list(root)?;

    if json {
        return output::print_json(&domains);
    }
    if domains.is_empty() {
        println!("no domains provisioned yet (run a spec with `liftoff run`)");
        return Ok(());
    }
    println!("{:<20} {:>5} {:>7} {:>7}  name", "slug", "goals", "sources", "notices");
    for domain in domains {
        println!(
            "{:<20} {:>5} {:>7} {:>7}  {}",
            domain.slug,
            domain.goals.len(),
            domain.sources.len(),
            domain.notices.len(),
            domain.name
        );
    }
    Ok(())
}

pub fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    LiftoffConfig::load(root)?;
    let domain = DomainManifest::load(root, slug)?;

    if json {
        return output::print_json(&domain);
    }
    println!("{} ({})", domain.name, domain.slug);
    output::print_kv("created", domain.created_at.format("%Y-%m-%d %H:%M UTC"));
    output::print_kv("updated", domain.updated_at.format("%Y-%m-%d %H:%M UTC"));

    if !domain.goals.is_empty() {
        println!();
        println!("goals:");
        for goal in &domain.goals {
            let mark = if goal.done { "x" } else { " " };
            println!("  [{mark}] {:<4} {}", goal.id, goal.title);
        }
    }
    if !domain.sources.is_empty() {
        println!();
        println!("sources:");
        for source in &domain.sources {
            println!("  {:<4} {:<8} {}", source.id, source.kind, source.location);
        }
    }
    if !domain.notices.is_empty() {
        println!();
        println!("notices:");
        for notice in &domain.notices {
            println!("  {}  {}", notice.at.format("%Y-%m-%d %H:%M"), notice.message);
        }
    }
    Ok(())
}
