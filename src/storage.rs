//! Run-scoped output layout and stage artifact persistence.
//!
//! Every run gets a timestamped base directory under `{root}/output/`;
//! each stage writes into its own subdirectory with a date-tagged file
//! name. Paths are a pure function of (base, stage, prefix, calendar
//! date), so re-running on the same day overwrites the earlier artifact.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::FILE_PREFIX;
use crate::dataset::Dataset;
use crate::error::StorageResult;

// =============================================================================
// Stage
// =============================================================================

/// Pipeline checkpoint at which a dataset snapshot may be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Staging,
    Final,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Raw => "raw",
            Stage::Staging => "staging",
            Stage::Final => "final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Run Context
// =============================================================================

/// Base output location of one pipeline run.
///
/// Created once at run start, read-only afterwards. All stage paths
/// derive from it; nothing about the run is registered anywhere else.
#[derive(Debug, Clone)]
pub struct RunContext {
    base: PathBuf,
}

impl RunContext {
    /// Create the timestamped base directory for a new run.
    pub fn create(root: &Path) -> StorageResult<Self> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let base = root.join("output").join(format!("{timestamp}_run"));
        fs::create_dir_all(&base)?;
        info!(dir = %base.display(), "created output directory for this run");
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Stage subdirectory, created on first use.
    pub fn stage_dir(&self, stage: Stage) -> StorageResult<PathBuf> {
        stage_path(&self.base, stage)
    }
}

/// Create (idempotently) and return the stage directory under `base`.
pub fn stage_path(base: &Path, stage: Stage) -> StorageResult<PathBuf> {
    let dir = base.join(stage.as_str());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Deterministic artifact path: `{dir}/{prefix}_{stage}_{YYYY-MM-DD}.csv`.
pub fn artifact_path(dir: &Path, prefix: &str, stage: Stage) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    dir.join(format!("{prefix}_{stage}_{date}.csv"))
}

// =============================================================================
// Persistence Writer
// =============================================================================

/// Persist a dataset snapshot as a stage-tagged, date-tagged CSV file.
///
/// An absent dataset is a logged no-op, not an error. Serialization and
/// IO failures are logged and yield `None`; nothing propagates.
pub fn write_stage_csv(
    dataset: Option<&Dataset>,
    dir: &Path,
    prefix: &str,
    stage: Stage,
) -> Option<PathBuf> {
    let Some(dataset) = dataset else {
        warn!(%stage, "attempted to save an absent dataset, skipping");
        return None;
    };

    let path = artifact_path(dir, prefix, stage);
    match try_write_csv(dataset, &path) {
        Ok(()) => {
            info!(%stage, path = %path.display(), "successfully saved stage data");
            Some(path)
        }
        Err(err) => {
            error!(%stage, path = %path.display(), "error saving stage data: {err}");
            None
        }
    }
}

/// Serialize with a header row and no row-index column.
pub fn try_write_csv(dataset: &Dataset, path: &Path) -> StorageResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&dataset.headers)?;
    for record in &dataset.records {
        let row: Vec<String> = dataset
            .headers
            .iter()
            .map(|h| format_cell(record.get(h).unwrap_or(&Value::Null)))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Persist under the run's stage directory with the standard prefix.
pub fn persist_stage(
    dataset: Option<&Dataset>,
    run: &RunContext,
    stage: Stage,
) -> Option<PathBuf> {
    let dir = match run.stage_dir(stage) {
        Ok(dir) => dir,
        Err(err) => {
            error!(%stage, "failed to create stage directory: {err}");
            return None;
        }
    };
    write_stage_csv(dataset, &dir, FILE_PREFIX, stage)
}

/// CSV text form of one cell: missing values serialize as empty fields.
fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use tempfile::tempdir;

    fn dataset() -> Dataset {
        let headers = vec!["tenure".to_string(), "Churn".to_string()];
        let mut row1 = Map::new();
        row1.insert("tenure".into(), json!(12));
        row1.insert("Churn".into(), json!("Yes"));
        let mut row2 = Map::new();
        row2.insert("tenure".into(), Value::Null);
        row2.insert("Churn".into(), json!("No"));
        Dataset::new(headers, vec![row1, row2])
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Raw.as_str(), "raw");
        assert_eq!(Stage::Staging.to_string(), "staging");
        assert_eq!(Stage::Final.to_string(), "final");
    }

    #[test]
    fn test_run_context_creates_base_dir() {
        let root = tempdir().unwrap();
        let run = RunContext::create(root.path()).unwrap();
        assert!(run.base().is_dir());
        assert!(run.base().starts_with(root.path().join("output")));

        // Creating again on the same second resolves to the same path.
        let again = RunContext::create(root.path()).unwrap();
        assert!(again.base().is_dir());
    }

    #[test]
    fn test_stage_path_idempotent() {
        let root = tempdir().unwrap();
        let run = RunContext::create(root.path()).unwrap();
        let first = run.stage_dir(Stage::Raw).unwrap();
        let second = run.stage_dir(Stage::Raw).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("raw"));
    }

    #[test]
    fn test_artifact_path_deterministic() {
        let dir = PathBuf::from("/tmp/run/raw");
        let a = artifact_path(&dir, FILE_PREFIX, Stage::Raw);
        let b = artifact_path(&dir, FILE_PREFIX, Stage::Raw);
        assert_eq!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("telco_customer_churn_raw_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_write_absent_dataset_is_noop() {
        let dir = tempdir().unwrap();
        let result = write_stage_csv(None, dir.path(), FILE_PREFIX, Stage::Staging);
        assert!(result.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_dataset_round_trip() {
        let dir = tempdir().unwrap();
        let ds = dataset();
        let path = write_stage_csv(Some(&ds), dir.path(), FILE_PREFIX, Stage::Final).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "tenure,Churn");
        assert_eq!(lines.next().unwrap(), "12,Yes");
        // Missing value serializes as an empty field.
        assert_eq!(lines.next().unwrap(), ",No");
    }

    #[test]
    fn test_write_failure_returns_none() {
        let ds = dataset();
        let missing_dir = PathBuf::from("/nonexistent/dir/for/sure");
        let result = write_stage_csv(Some(&ds), &missing_dir, FILE_PREFIX, Stage::Raw);
        assert!(result.is_none());
    }

    #[test]
    fn test_persist_stage_writes_under_run() {
        let root = tempdir().unwrap();
        let run = RunContext::create(root.path()).unwrap();
        let ds = dataset();
        let path = persist_stage(Some(&ds), &run, Stage::Raw).unwrap();
        assert!(path.starts_with(run.base()));
        assert!(path.is_file());
    }
}
