//! Error types for the churn data-preparation pipeline.
//!
//! This module defines one error type per pipeline concern:
//!
//! - [`FetchError`] - external download tool failures
//! - [`LoadError`] - delimited file loading failures
//! - [`DbError`] - database connection and query failures
//! - [`CleanError`] - cleaning transformation failures
//! - [`StorageError`] - artifact persistence failures
//! - [`ConfigError`] - startup configuration failures
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Stage boundaries
//! never propagate these errors upward; the `try_*` operations return
//! them so callers (and tests) can inspect the failure class, while
//! the plain operations log and degrade to an absence sentinel.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Remote Fetch Errors
// =============================================================================

/// Errors while invoking the external dataset download tool.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The tool binary could not be started.
    #[error("download tool '{command}' could not be started: {source}")]
    ToolNotFound {
        command: String,
        source: std::io::Error,
    },

    /// The tool ran but exited with a failure status.
    #[error("download tool exited with {status}: {stderr}")]
    ToolFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The tool reported success but the expected file is not there.
    #[error("expected file '{expected}' not found after download")]
    MissingArtifact {
        expected: String,
        found: Vec<String>,
    },

    /// IO error around the download (destination directory, etc.).
    #[error("io error during download: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// File Load Errors
// =============================================================================

/// Errors while loading a delimited input file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The input file has no content (or no header row).
    #[error("input file is empty: {0}")]
    EmptyInput(PathBuf),

    /// The input file could not be parsed as delimited text.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Anything else that went wrong while reading.
    #[error("unexpected error reading input: {0}")]
    Unknown(String),
}

// =============================================================================
// Database Errors
// =============================================================================

/// Errors while loading from PostgreSQL.
#[derive(Debug, Error)]
pub enum DbError {
    /// `DB_PORT` is not a valid port number.
    #[error("invalid DB_PORT '{0}'")]
    InvalidPort(String),

    /// Driver-level connection failure.
    #[error("database connection failed: {0}")]
    Connect(String),

    /// The query was rejected or failed mid-execution.
    #[error("query execution failed: {0}")]
    Query(String),
}

impl DbError {
    /// Driver/connection-level failures log differently from the rest.
    pub fn is_driver_error(&self) -> bool {
        matches!(self, DbError::Connect(_) | DbError::Query(_))
    }
}

// =============================================================================
// Cleaning Errors
// =============================================================================

/// Errors during the cleaning transformation.
///
/// Only the charges-column step is fatal; the other steps log and
/// continue, so they never surface here.
#[derive(Debug, Error)]
pub enum CleanError {
    /// A required column is missing from the dataset schema.
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors while persisting a stage artifact.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error (directory creation, file write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("csv serialization error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors validating startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required credential variables are unset.
    #[error("database credentials missing from environment: {}", missing.join(", "))]
    MissingCredentials { missing: Vec<String> },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// Wraps every lower-level error so the CLI can report any failure
/// with a single type.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Remote fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// File load error.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Database error.
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// Cleaning error.
    #[error("clean error: {0}")]
    Clean(#[from] CleanError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The run finished without producing a final dataset.
    #[error("pipeline run produced no final dataset")]
    Aborted,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for remote fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for file load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Result type for cleaning operations.
pub type CleanResult<T> = Result<T, CleanError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::NotFound(PathBuf::from("/tmp/missing.csv"));
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("missing.csv"));

        // CleanError -> PipelineError
        let clean_err = CleanError::MissingColumn("TotalCharges".into());
        let pipeline_err: PipelineError = clean_err.into();
        assert!(pipeline_err.to_string().contains("TotalCharges"));

        // ConfigError -> PipelineError
        let config_err = ConfigError::MissingCredentials {
            missing: vec!["DB_PASSWORD".into()],
        };
        let pipeline_err: PipelineError = config_err.into();
        assert!(pipeline_err.to_string().contains("DB_PASSWORD"));
    }

    #[test]
    fn test_missing_credentials_lists_all_fields() {
        let err = ConfigError::MissingCredentials {
            missing: vec!["DB_HOST".into(), "DB_PORT".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("DB_HOST"));
        assert!(msg.contains("DB_PORT"));
    }

    #[test]
    fn test_db_error_classification() {
        assert!(DbError::Connect("refused".into()).is_driver_error());
        assert!(DbError::Query("syntax".into()).is_driver_error());
        assert!(!DbError::InvalidPort("abc".into()).is_driver_error());
    }

    #[test]
    fn test_missing_artifact_format() {
        let err = FetchError::MissingArtifact {
            expected: "churn.csv".into(),
            found: vec!["other.zip".into()],
        };
        assert!(err.to_string().contains("churn.csv"));
    }
}
