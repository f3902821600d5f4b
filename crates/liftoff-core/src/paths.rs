use crate::error::{LiftoffError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Workspace layout
// ---------------------------------------------------------------------------

pub const LIFTOFF_DIR: &str = ".liftoff";
pub const SPECS_DIR: &str = ".liftoff/specs";
pub const DOMAINS_DIR: &str = ".liftoff/domains";
pub const RUNS_DIR: &str = ".liftoff/runs";
pub const SPEC_ARCHIVES_DIR: &str = ".liftoff/archives/specs";
pub const CONFIG_FILE: &str = ".liftoff/config.yaml";

pub fn liftoff_dir(root: &Path) -> PathBuf {
    root.join(LIFTOFF_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn specs_dir(root: &Path) -> PathBuf {
    root.join(SPECS_DIR)
}

pub fn spec_path(root: &Path, slug: &str) -> PathBuf {
    specs_dir(root).join(format!("{slug}.yaml"))
}

pub fn spec_archive_path(root: &Path, slug: &str, version: u32) -> PathBuf {
    root.join(SPEC_ARCHIVES_DIR).join(format!("{slug}@{version}.yaml"))
}

pub fn domains_dir(root: &Path) -> PathBuf {
    root.join(DOMAINS_DIR)
}

pub fn domain_dir(root: &Path, slug: &str) -> PathBuf {
    domains_dir(root).join(slug)
}

pub fn domain_manifest_path(root: &Path, slug: &str) -> PathBuf {
    domain_dir(root, slug).join("manifest.yaml")
}

pub fn domain_prompts_dir(root: &Path, slug: &str) -> PathBuf {
    domain_dir(root, slug).join("prompts")
}

pub fn runs_dir(root: &Path) -> PathBuf {
    root.join(RUNS_DIR)
}

pub fn run_path(root: &Path, id: &str) -> PathBuf {
    runs_dir(root).join(format!("{id}.json"))
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

pub const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").expect("slug regex is valid")
    })
}

/// Slugs name specs, domains, and archive entries; they must be safe as
/// directory and file name components.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN || !slug_re().is_match(slug) {
        return Err(LiftoffError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

pub fn is_valid_slug(slug: &str) -> bool {
    validate_slug(slug).is_ok()
}

/// Derive a slug from free-form text: lowercase, alphanumeric runs joined by
/// single hyphens, truncated to the slug length limit.
pub fn slugify(text: &str) -> String {
    let mut out = String::new();
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out.truncate(MAX_SLUG_LEN);
    while out.ends_with('-') {
        out.pop();
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
