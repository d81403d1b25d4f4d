//! Data acquisition: the three ways a raw dataset enters the pipeline.
//!
//! - [`remote`] - shell out to the external download tool
//! - [`file`] - load a delimited local file
//! - [`db`] - run one query against PostgreSQL
//!
//! Each public operation logs its own failure and returns an absence
//! sentinel instead of propagating; the `try_*` variants expose the
//! typed errors. A successful load with a run context persists exactly
//! one `raw` stage artifact.

pub mod db;
pub mod file;
pub mod remote;

pub use db::{load_query, load_query_from_env, try_load_query};
pub use file::{load_csv_file, try_load_csv_file};
pub use remote::{fetch_remote, try_fetch_remote};
