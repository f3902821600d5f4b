//! Run records: one JSON file per run under `.liftoff/runs/`, pruned by the
//! configured retention.

use crate::checks::ReadinessReport;
use crate::error::{LiftoffError, Result};
use crate::io::atomic_write;
use crate::paths;
use crate::runner::RunOutcome;
use crate::saga::Preview;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Run,
    Analyze,
    Commit,
    Check,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Run => "run",
            RunKind::Analyze => "analyze",
            RunKind::Commit => "commit",
            RunKind::Check => "check",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub spec: String,
    pub kind: RunKind,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default)]
    pub steps_run: usize,
    #[serde(default)]
    pub steps_skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
}

/// Run ids sort chronologically by construction: timestamp prefix, random
/// suffix for uniqueness within a second.
pub fn generate_run_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%d%H%M%S"), &suffix[..8])
}

impl RunRecord {
    pub fn from_outcome(kind: RunKind, outcome: &RunOutcome) -> Self {
        Self {
            id: generate_run_id(),
            spec: outcome.spec.clone(),
            kind,
            status: RunStatus::Completed,
            started_at: outcome.started_at,
            duration_ms: outcome.duration_ms,
            steps_run: outcome.steps_run,
            steps_skipped: outcome.steps_skipped,
            warnings: outcome.warnings.clone(),
            error: None,
            score: None,
            ready: None,
        }
    }

    pub fn from_failure(
        kind: RunKind,
        spec: &str,
        started_at: DateTime<Utc>,
        error: &str,
    ) -> Self {
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        Self {
            id: generate_run_id(),
            spec: spec.to_string(),
            kind,
            status: RunStatus::Failed,
            started_at,
            duration_ms,
            steps_run: 0,
            steps_skipped: 0,
            warnings: Vec::new(),
            error: Some(error.to_string()),
            score: None,
            ready: None,
        }
    }

    pub fn from_preview(preview: &Preview, started_at: DateTime<Utc>) -> Self {
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        Self {
            id: generate_run_id(),
            spec: preview.spec.clone(),
            kind: RunKind::Analyze,
            status: RunStatus::Completed,
            started_at,
            duration_ms,
            steps_run: preview.summary.steps_analyzed,
            steps_skipped: preview.summary.steps_skipped,
            warnings: preview.warnings.clone(),
            error: None,
            score: None,
            ready: None,
        }
    }

    pub fn from_report(report: &ReadinessReport, started_at: DateTime<Utc>) -> Self {
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        Self {
            id: generate_run_id(),
            spec: report.spec.clone(),
            kind: RunKind::Check,
            status: RunStatus::Completed,
            started_at,
            duration_ms,
            steps_run: 0,
            steps_skipped: 0,
            warnings: Vec::new(),
            error: None,
            score: Some(report.score),
            ready: Some(report.ready),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        atomic_write(&paths::run_path(root, &self.id), &body)
    }
}

// ---------------------------------------------------------------------------
// Listing and retention
// ---------------------------------------------------------------------------

pub fn load_run(root: &Path, id: &str) -> Result<RunRecord> {
    let path = paths::run_path(root, id);
    if !path.exists() {
        return Err(LiftoffError::RunNotFound(id.to_string()));
    }
    let raw = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// All run records, newest first. Unreadable files are skipped.
pub fn list_runs(root: &Path) -> Result<Vec<RunRecord>> {
    let dir = paths::runs_dir(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut records = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        match load_run(root, &id) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "skipping unreadable run record");
            }
        }
    }
    records.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(records)
}

/// Delete the oldest run records beyond `keep`. Returns how many files were
/// removed.
pub fn enforce_retention(root: &Path, keep: usize) -> Result<usize> {
    let dir = paths::runs_dir(root);
    if !dir.exists() {
        return Ok(0);
    }
    let mut ids = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
            ids.push(id.to_string());
        }
    }
    ids.sort_by(|a, b| b.cmp(a));
    let mut deleted = 0;
    for id in ids.iter().skip(keep) {
        fs::remove_file(paths::run_path(root, id))?;
        deleted += 1;
    }
    Ok(deleted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, spec: &str) -> RunRecord {
        RunRecord {
            id: id.to_string(),
            spec: spec.to_string(),
            kind: RunKind::Run,
            status: RunStatus::Completed,
            started_at: Utc::now(),
            duration_ms: 12,
            steps_run: 3,
            steps_skipped: 0,
            warnings: Vec::new(),
            error: None,
            score: None,
            ready: None,
        }
    }

    #[test]
    fn run_id_shape() {
        let id = generate_run_id();
        let (stamp, suffix) = id.split_once('-').unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = TempDir::new().unwrap();
        let mut rec = record("20250101000000-aaaaaaaa", "starter");
        rec.warnings.push("Seed goals: partial".into());
        rec.save(dir.path()).unwrap();

        let loaded = load_run(dir.path(), "20250101000000-aaaaaaaa").unwrap();
        assert_eq!(loaded.spec, "starter");
        assert_eq!(loaded.kind, RunKind::Run);
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn load_missing_run_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_run(dir.path(), "20250101000000-ffffffff"),
            Err(LiftoffError::RunNotFound(_))
        ));
    }

    #[test]
    fn list_orders_newest_first() {
        let dir = TempDir::new().unwrap();
        record("20250101000000-aaaaaaaa", "one").save(dir.path()).unwrap();
        record("20250301000000-cccccccc", "three").save(dir.path()).unwrap();
        record("20250201000000-bbbbbbbb", "two").save(dir.path()).unwrap();

        let runs = list_runs(dir.path()).unwrap();
        let specs: Vec<&str> = runs.iter().map(|r| r.spec.as_str()).collect();
        assert_eq!(specs, ["three", "two", "one"]);
    }

    #[test]
    fn retention_removes_oldest_beyond_keep() {
        let dir = TempDir::new().unwrap();
        record("20250101000000-aaaaaaaa", "one").save(dir.path()).unwrap();
        record("20250201000000-bbbbbbbb", "two").save(dir.path()).unwrap();
        record("20250301000000-cccccccc", "three").save(dir.path()).unwrap();

        let deleted = enforce_retention(dir.path(), 2).unwrap();
        assert_eq!(deleted, 1);
        let remaining: Vec<String> =
            list_runs(dir.path()).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(
            remaining,
            ["20250301000000-cccccccc", "20250201000000-bbbbbbbb"]
        );
    }

    #[test]
    fn retention_with_room_deletes_nothing() {
        let dir = TempDir::new().unwrap();
        record("20250101000000-aaaaaaaa", "one").save(dir.path()).unwrap();
        assert_eq!(enforce_retention(dir.path(), 50).unwrap(), 0);
        assert_eq!(list_runs(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn check_record_carries_score() {
        use crate::checks::{ReadinessLevel, ReadinessReport};
        let report = ReadinessReport {
            spec: "starter".into(),
            score: 67,
            level: ReadinessLevel::Almost,
            ready: true,
            critical: Vec::new(),
            recommended: Vec::new(),
            optional: Vec::new(),
            generated_at: Utc::now(),
        };
        let rec = RunRecord::from_report(&report, Utc::now());
        assert_eq!(rec.kind, RunKind::Check);
        assert_eq!(rec.score, Some(67));
        assert_eq!(rec.ready, Some(true));
    }
}
