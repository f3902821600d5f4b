use crate::output;
use liftoff_core::config::LiftoffConfig;
use liftoff_core::io::{ensure_dir, ensure_gitignore_entry, write_if_missing};
use liftoff_core::paths;
use std::path::Path;

const STARTER_SPEC: &str = r#"slug: starter
name: Starter workspace
description: Provision a domain workspace with goals and a welcome prompt.
steps:
  - id: create
    name: Create workspace
    operation: domain.create
    order: 1
    phase: analyze
    progress_message: Creating the domain workspace
  - id: goals
    name: Seed starter goals
    operation: domain.seed_goals
    order: 2
    on_error: continue
    args:
      goals:
        - Define the first milestone
        - Attach one reference source
  - id: welcome
    name: Render welcome prompt
    operation: prompt.render
    order: 3
    on_error: continue
    args:
      target: welcome
      template: |
        # Welcome to ${name}

        This workspace was provisioned by liftoff.
        Goals seeded so far: ${goals_total}
checks:
  - id: manifest
    name: Workspace manifest exists
    severity: critical
    query: manifest.exists
    fix_action_template: liftoff run starter --input name=${name}
  - id: goals
    name: At least one goal is defined
    severity: recommended
    query: goals.min_count
    args:
      min: 1
  - id: welcome
    name: Welcome prompt rendered
    severity: optional
    query: path.exists
    args:
      path: ${domain_path}/prompts/welcome.md
"#;

pub fn run(root: &Path, name: Option<String>, json: bool) -> anyhow::Result<()> {
    let project = name.unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    let mut created = Vec::new();
    let mut existed = Vec::new();
    let mut track = |label: &str, was_created: bool| {
        if was_created {
            created.push(label.to_string());
        } else {
            existed.push(label.to_string());
        }
    };

    for (label, dir) in [
        (paths::SPECS_DIR, paths::specs_dir(root)),
        (paths::DOMAINS_DIR, paths::domains_dir(root)),
        (paths::RUNS_DIR, paths::runs_dir(root)),
        (paths::SPEC_ARCHIVES_DIR, root.join(paths::SPEC_ARCHIVES_DIR)),
    ] {
        let was_created = !dir.is_dir();
        ensure_dir(&dir)?;
        track(label, was_created);
    }

    let config_body = serde_yaml::to_string(&LiftoffConfig::new(project.as_str()))?;
    track(paths::CONFIG_FILE, write_if_missing(&paths::config_path(root), &config_body)?);
    track(
        ".liftoff/specs/starter.yaml",
        write_if_missing(&paths::spec_path(root, "starter"), STARTER_SPEC)?,
    );
    track(".gitignore (.liftoff/runs/)", ensure_gitignore_entry(root, ".liftoff/runs/")?);

    if json {
        #[derive(serde::Serialize)]
        struct InitOutput {
            root: String,
            project: String,
            created: Vec<String>,
            existed: Vec<String>,
        }
        return output::print_json(&InitOutput {
            root: root.display().to_string(),
            project,
            created,
            existed,
        });
    }

    println!("initialized liftoff workspace '{project}' in {}", root.display());
    for label in &created {
        println!("  created: {label}");
    }
    for label in &existed {
        println!("  exists:  {label}");
    }
    Ok(())
}
