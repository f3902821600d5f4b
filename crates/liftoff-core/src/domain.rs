//! Domain workspaces: the durable artifacts provisioning produces. Each
//! domain owns a directory under `.liftoff/domains/<slug>/` with a YAML
//! manifest and rendered prompt files.

use crate::error::{LiftoffError, Result};
use crate::io::{atomic_write, ensure_dir};
use crate::paths::{self, validate_slug};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Manifest types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub kind: String,
    pub location: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainManifest {
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    #[serde(default)]
    pub notices: Vec<Notice>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

impl DomainManifest {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            goals: Vec::new(),
            sources: Vec::new(),
            notices: Vec::new(),
            settings: Map::new(),
        }
    }

    /// Load an existing domain or create a fresh one. Creation is keyed on
    /// the slug alone, so repeated calls converge on the same workspace.
    /// Returns the manifest and whether it was created by this call.
    pub fn find_or_create(root: &Path, slug: &str, name: &str) -> Result<(Self, bool)> {
        validate_slug(slug)?;
        match Self::load(root, slug) {
            Ok(existing) => Ok((existing, false)),
            Err(LiftoffError::DomainNotFound(_)) => {
                ensure_dir(&paths::domain_prompts_dir(root, slug))?;
                let mut manifest = Self::new(slug, name);
                manifest.save(root)?;
                Ok((manifest, true))
            }
            Err(e) => Err(e),
        }
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        validate_slug(slug)?;
        let path = paths::domain_manifest_path(root, slug);
        if !path.exists() {
            return Err(LiftoffError::DomainNotFound(slug.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn save(&mut self, root: &Path) -> Result<()> {
        self.updated_at = Utc::now();
        let body = serde_yaml::to_string(self)?;
        atomic_write(&paths::domain_manifest_path(root, &self.slug), &body)
    }

    pub fn exists(root: &Path, slug: &str) -> bool {
        paths::domain_manifest_path(root, slug).exists()
    }

    /// Every domain with a readable manifest, sorted by slug. Directories
    /// without a manifest and unreadable manifests are skipped.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = paths::domains_dir(root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut domains = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(slug) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match Self::load(root, &slug) {
                Ok(manifest) => domains.push(manifest),
                Err(LiftoffError::DomainNotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "skipping unreadable domain");
                }
            }
        }
        domains.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(domains)
    }
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

impl DomainManifest {
    pub fn has_goal(&self, title: &str) -> bool {
        self.goals.iter().any(|g| g.title == title)
    }

    /// Append a goal with the next sequential id (G1, G2, ...).
    pub fn add_goal(&mut self, title: impl Into<String>) -> String {
        let id = next_seq_id('G', self.goals.iter().map(|g| g.id.as_str()));
        self.goals.push(Goal { id: id.clone(), title: title.into(), done: false });
        id
    }

    pub fn has_source(&self, location: &str) -> bool {
        self.sources.iter().any(|s| s.location == location)
    }

    pub fn add_source(&mut self, kind: impl Into<String>, location: impl Into<String>) -> String {
        let id = next_seq_id('S', self.sources.iter().map(|s| s.id.as_str()));
        self.sources.push(SourceRef {
            id: id.clone(),
            kind: kind.into(),
            location: location.into(),
            added_at: Utc::now(),
        });
        id
    }

    pub fn has_notice(&self, message: &str) -> bool {
        self.notices.iter().any(|n| n.message == message)
    }

    pub fn add_notice(&mut self, message: impl Into<String>) {
        self.notices.push(Notice { at: Utc::now(), message: message.into() });
    }
}

fn next_seq_id<'a>(prefix: char, existing: impl Iterator<Item = &'a str>) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", max + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_or_create_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (mut first, created) = DomainManifest::find_or_create(dir.path(), "acme", "Acme").unwrap();
        assert!(created);
        first.add_goal("Ship v1");
        first.save(dir.path()).unwrap();

        let (second, created) = DomainManifest::find_or_create(dir.path(), "acme", "Acme").unwrap();
        assert!(!created);
        assert_eq!(second.goals.len(), 1);
        assert!(paths::domain_prompts_dir(dir.path(), "acme").is_dir());
    }

    #[test]
    fn load_missing_domain_is_not_found() {
        let dir = TempDir::new().unwrap();
        match DomainManifest::load(dir.path(), "ghost") {
            Err(LiftoffError::DomainNotFound(slug)) => assert_eq!(slug, "ghost"),
            other => panic!("expected DomainNotFound, got {other:?}"),
        }
    }

    #[test]
    fn invalid_slug_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            DomainManifest::find_or_create(dir.path(), "Not A Slug", "x"),
            Err(LiftoffError::InvalidSlug(_))
        ));
    }

    #[test]
    fn goal_ids_are_sequential_across_reloads() {
        let dir = TempDir::new().unwrap();
        let (mut manifest, _) = DomainManifest::find_or_create(dir.path(), "acme", "Acme").unwrap();
        assert_eq!(manifest.add_goal("First"), "G1");
        assert_eq!(manifest.add_goal("Second"), "G2");
        manifest.save(dir.path()).unwrap();

        let mut reloaded = DomainManifest::load(dir.path(), "acme").unwrap();
        assert_eq!(reloaded.add_goal("Third"), "G3");
        assert!(reloaded.has_goal("First"));
        assert!(!reloaded.has_goal("Fourth"));
    }

    #[test]
    fn source_ids_and_location_dedup_helper() {
        let mut manifest = DomainManifest::new("acme", "Acme");
        assert_eq!(manifest.add_source("url", "https://example.com/a"), "S1");
        assert_eq!(manifest.add_source("file", "./notes.md"), "S2");
        assert!(manifest.has_source("./notes.md"));
        assert!(!manifest.has_source("./other.md"));
    }

    #[test]
    fn notices_record_and_match_by_message() {
        let mut manifest = DomainManifest::new("acme", "Acme");
        manifest.add_notice("Workspace provisioned");
        assert!(manifest.has_notice("Workspace provisioned"));
        assert!(!manifest.has_notice("Something else"));
    }

    #[test]
    fn list_sorts_and_skips_bare_directories() {
        let dir = TempDir::new().unwrap();
        DomainManifest::find_or_create(dir.path(), "zeta", "Zeta").unwrap();
        DomainManifest::find_or_create(dir.path(), "alpha", "Alpha").unwrap();
        fs::create_dir_all(paths::domain_dir(dir.path(), "bare")).unwrap();

        let listed = DomainManifest::list(dir.path()).unwrap();
        let slugs: Vec<&str> = listed.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["alpha", "zeta"]);
    }

    #[test]
    fn manifest_roundtrips_through_yaml() {
        let dir = TempDir::new().unwrap();
        let (mut manifest, _) = DomainManifest::find_or_create(dir.path(), "acme", "Acme").unwrap();
        manifest.add_goal("Ship");
        manifest.add_source("url", "https://example.com");
        manifest.add_notice("hello");
        manifest.settings.insert("tier".into(), serde_json::json!("starter"));
        manifest.save(dir.path()).unwrap();

        let loaded = DomainManifest::load(dir.path(), "acme").unwrap();
        assert_eq!(loaded.name, "Acme");
        assert_eq!(loaded.goals.len(), 1);
        assert_eq!(loaded.sources.len(), 1);
        assert_eq!(loaded.notices.len(), 1);
        assert_eq!(loaded.settings.get("tier"), Some(&serde_json::json!("starter")));
    }
}
