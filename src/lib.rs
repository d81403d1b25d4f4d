//! # Telco Insights - staged churn data-preparation pipeline
//!
//! Acquires the Telco customer churn dataset (remote download, local
//! file, or PostgreSQL query), applies a fixed sequence of cleaning
//! transformations, and persists versioned snapshots at three stages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │   Source    │────▶│  Acquirer   │────▶│   Cleaner    │
//! │ (cli/file/  │     │ [raw stage] │     │ [staging +   │
//! │  postgres)  │     │             │     │  final stage]│
//! └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! Every stage boundary returns either a dataset or an explicit
//! absence; failures are logged where they happen and never propagate
//! across stages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use telco_insights::pipeline::run_from_file;
//! use std::path::Path;
//!
//! let cleaned = run_from_file(Path::new("churn.csv"), Path::new("."));
//! if let Some(dataset) = cleaned {
//!     println!("cleaned {} rows", dataset.n_rows());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - per-concern error types and the failure taxonomy
//! - [`config`] - validated credentials, tool resolution, column names
//! - [`dataset`] - the in-memory tabular snapshot
//! - [`acquire`] - remote fetch, file load, database load
//! - [`clean`] - the cleaning transformation
//! - [`storage`] - run layout and stage artifact persistence
//! - [`pipeline`] - run orchestration
//! - [`logging`] - console + file tracing setup

// Core modules
pub mod config;
pub mod dataset;
pub mod error;

// Acquisition
pub mod acquire;

// Transformation
pub mod clean;

// Persistence
pub mod storage;

// Orchestration
pub mod pipeline;

// Observability
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CleanError, ConfigError, DbError, FetchError, LoadError, PipelineError, StorageError,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{CleanColumns, DbConfig, DownloadTool, RemoteDataset, FILE_PREFIX};

// =============================================================================
// Re-exports - Dataset
// =============================================================================

pub use dataset::{Dataset, NumericSummary};

// =============================================================================
// Re-exports - Acquisition
// =============================================================================

pub use acquire::{
    fetch_remote, load_csv_file, load_query, load_query_from_env, try_fetch_remote,
    try_load_csv_file, try_load_query,
};

// =============================================================================
// Re-exports - Cleaning
// =============================================================================

pub use clean::{clean, clean_with_columns, try_clean};

// =============================================================================
// Re-exports - Storage
// =============================================================================

pub use storage::{persist_stage, stage_path, write_stage_csv, RunContext, Stage};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{run_from_file, run_from_query};
