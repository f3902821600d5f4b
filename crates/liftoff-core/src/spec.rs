//! Setup specs: the YAML documents that declare provisioning steps and
//! readiness checks. Specs are data; the operations they name resolve
//! against the handler registry at run time.

use crate::error::{LiftoffError, Result};
use crate::io::atomic_write;
use crate::paths::{self, validate_slug};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Failure policy for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Stop the run and surface the failure.
    #[default]
    Abort,
    /// Record a warning, mark the step skipped, and keep going.
    Continue,
}

impl OnError {
    pub fn all() -> &'static [OnError] {
        &[OnError::Abort, OnError::Continue]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OnError::Abort => "abort",
            OnError::Continue => "continue",
        }
    }
}

impl fmt::Display for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnError {
    type Err = LiftoffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(OnError::Abort),
            "continue" => Ok(OnError::Continue),
            _ => Err(LiftoffError::InvalidPolicy(s.to_string())),
        }
    }
}

/// Weight of a readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    #[default]
    Recommended,
    Optional,
}

impl Severity {
    pub fn all() -> &'static [Severity] {
        &[Severity::Critical, Severity::Recommended, Severity::Optional]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Recommended => "recommended",
            Severity::Optional => "optional",
        }
    }

    /// Critical failures gate overall readiness.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LiftoffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "critical" => Ok(Severity::Critical),
            "recommended" => Ok(Severity::Recommended),
            "optional" => Ok(Severity::Optional),
            _ => Err(LiftoffError::InvalidSeverity(s.to_string())),
        }
    }
}

/// Which half of a two-phase run a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecPhase {
    Analyze,
    #[default]
    Commit,
}

impl SpecPhase {
    pub fn all() -> &'static [SpecPhase] {
        &[SpecPhase::Analyze, SpecPhase::Commit]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecPhase::Analyze => "analyze",
            SpecPhase::Commit => "commit",
        }
    }
}

impl fmt::Display for SpecPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecPhase {
    type Err = LiftoffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "analyze" => Ok(SpecPhase::Analyze),
            "commit" => Ok(SpecPhase::Commit),
            _ => Err(LiftoffError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Spec documents
// ---------------------------------------------------------------------------

fn default_order() -> i64 {
    0
}

fn default_version() -> u32 {
    1
}

/// One provisioning step. `operation` names a registered handler; `args`
/// carry handler-specific parameters verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    pub id: String,
    pub name: String,
    pub operation: String,
    #[serde(default = "default_order")]
    pub order: i64,
    #[serde(default)]
    pub on_error: OnError,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_message: Option<String>,
    #[serde(default)]
    pub phase: SpecPhase,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

impl StepSpec {
    /// Text announced before the step runs.
    pub fn progress_text(&self) -> &str {
        self.progress_message.as_deref().unwrap_or(&self.name)
    }
}

/// One readiness check. `query` names a registered executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_action_template: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

/// A setup spec document as stored under `.liftoff/specs/<slug>.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupSpec {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl SetupSpec {
    /// Load a spec by slug. A missing file is `SpecNotFound`; a file that
    /// parses badly or declares no steps is `SpecMalformed`.
    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        validate_slug(slug)?;
        let path = paths::spec_path(root, slug);
        if !path.exists() {
            return Err(LiftoffError::SpecNotFound(slug.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        let mut spec: SetupSpec = serde_yaml::from_str(&raw).map_err(|e| {
            LiftoffError::SpecMalformed { slug: slug.to_string(), reason: e.to_string() }
        })?;
        spec.validate()?;
        spec.sort_steps();
        Ok(spec)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        validate_slug(&self.slug)?;
        let body = serde_yaml::to_string(self)?;
        atomic_write(&paths::spec_path(root, &self.slug), &body)
    }

    /// Import a spec document from an external file. Re-importing an existing
    /// slug archives the stored copy and bumps the version; the version field
    /// is managed here, not authored.
    pub fn import(root: &Path, file: &Path) -> Result<Self> {
        let raw = fs::read_to_string(file)?;
        let hint = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let mut spec: SetupSpec = serde_yaml::from_str(&raw)
            .map_err(|e| LiftoffError::SpecMalformed { slug: hint, reason: e.to_string() })?;
        spec.validate()?;
        spec.sort_steps();
        match Self::load(root, &spec.slug) {
            Ok(existing) => {
                let stored = fs::read_to_string(paths::spec_path(root, &spec.slug))?;
                atomic_write(
                    &paths::spec_archive_path(root, &spec.slug, existing.version),
                    &stored,
                )?;
                spec.version = existing.version + 1;
            }
            Err(LiftoffError::SpecNotFound(_)) => {
                spec.version = 1;
            }
            // Stored copy unreadable; replace it without archiving.
            Err(_) => {
                spec.version = 1;
            }
        }
        spec.save(root)?;
        Ok(spec)
    }

    fn validate(&self) -> Result<()> {
        validate_slug(&self.slug)?;
        if self.steps.is_empty() {
            return Err(LiftoffError::SpecMalformed {
                slug: self.slug.clone(),
                reason: "spec has no steps".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(LiftoffError::SpecMalformed {
                    slug: self.slug.clone(),
                    reason: "step with empty id".to_string(),
                });
            }
            if !seen.insert(step.id.as_str()) {
                return Err(LiftoffError::SpecMalformed {
                    slug: self.slug.clone(),
                    reason: format!("duplicate step id '{}'", step.id),
                });
            }
        }
        let mut seen = HashSet::new();
        for check in &self.checks {
            if check.id.trim().is_empty() {
                return Err(LiftoffError::SpecMalformed {
                    slug: self.slug.clone(),
                    reason: "check with empty id".to_string(),
                });
            }
            if !seen.insert(check.id.as_str()) {
                return Err(LiftoffError::SpecMalformed {
                    slug: self.slug.clone(),
                    reason: format!("duplicate check id '{}'", check.id),
                });
            }
        }
        Ok(())
    }

    /// Steps execute by ascending `order`; the sort is stable, so ties keep
    /// declaration order.
    fn sort_steps(&mut self) {
        self.steps.sort_by_key(|s| s.order);
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SpecSummary {
    pub slug: String,
    pub name: String,
    pub version: u32,
    pub steps: usize,
    pub checks: usize,
}

/// Summaries of every loadable spec, sorted by slug. Unreadable documents
/// are reported and skipped rather than failing the listing.
pub fn list_specs(root: &Path) -> Result<Vec<SpecSummary>> {
    let dir = paths::specs_dir(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut summaries = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let Some(slug) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        match SetupSpec::load(root, &slug) {
            Ok(spec) => summaries.push(SpecSummary {
                slug: spec.slug,
                name: spec.name,
                version: spec.version,
                steps: spec.steps.len(),
                checks: spec.checks.len(),
            }),
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "skipping unreadable spec");
            }
        }
    }
    summaries.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(summaries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
