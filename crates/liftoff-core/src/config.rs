use crate::error::{LiftoffError, Result};
use crate::io::atomic_write;
use crate::paths::{self, is_valid_slug};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

fn default_config_version() -> u32 {
    1
}

fn default_keep_runs() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// How many run records to retain before the oldest are pruned.
    #[serde(default = "default_keep_runs")]
    pub keep_runs: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_spec: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { keep_runs: default_keep_runs(), default_spec: None }
    }
}

/// Workspace configuration stored at `.liftoff/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftoffConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    pub project: String,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl LiftoffConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self { version: default_config_version(), project: project.into(), run: RunConfig::default() }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(LiftoffError::NotInitialized);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let body = serde_yaml::to_string(self)?;
        atomic_write(&paths::config_path(root), &body)
    }

    pub fn is_initialized(root: &Path) -> bool {
        paths::config_path(root).exists()
    }

    /// Non-fatal problems with the stored configuration.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.project.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "project".into(),
                message: "project name is empty".into(),
            });
        }
        if self.run.keep_runs == 0 {
            warnings.push(ConfigWarning {
                field: "run.keep_runs".into(),
                message: "retention of 0 deletes every run record immediately".into(),
            });
        }
        if let Some(slug) = &self.run.default_spec {
            if !is_valid_slug(slug) {
                warnings.push(ConfigWarning {
                    field: "run.default_spec".into(),
                    message: format!("'{slug}' is not a valid spec slug"),
                });
            }
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let config: LiftoffConfig = serde_yaml::from_str("project: demo\n").unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.run.keep_runs, 50);
        assert_eq!(config.run.default_spec, None);
    }

    #[test]
    fn load_without_file_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(LiftoffConfig::load(dir.path()), Err(LiftoffError::NotInitialized)));
        assert!(!LiftoffConfig::is_initialized(dir.path()));
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = TempDir::new().unwrap();
        let mut config = LiftoffConfig::new("demo");
        config.run.keep_runs = 10;
        config.run.default_spec = Some("starter".into());
        config.save(dir.path()).unwrap();

        let loaded = LiftoffConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.project, "demo");
        assert_eq!(loaded.run.keep_runs, 10);
        assert_eq!(loaded.run.default_spec.as_deref(), Some("starter"));
        assert!(LiftoffConfig::is_initialized(dir.path()));
    }

    #[test]
    fn validate_flags_suspect_values() {
        let mut config = LiftoffConfig::new("  ");
        config.run.keep_runs = 0;
        config.run.default_spec = Some("Not A Slug".into());
        let warnings = config.validate();
        let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, ["project", "run.keep_runs", "run.default_spec"]);
    }

    #[test]
    fn validate_accepts_sane_config() {
        let config = LiftoffConfig::new("demo");
        assert!(config.validate().is_empty());
    }
}
