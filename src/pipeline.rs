//! Run orchestration: acquire, clean, persist.
//!
//! A run obtains its output base path exactly once, feeds the acquirer
//! result straight into the transformer, and lets absence flow forward:
//! a failed acquisition leaves the cleaner with nothing to do and the
//! run ends with an absent result instead of an error.

use std::path::Path;

use tracing::error;

use crate::acquire;
use crate::clean;
use crate::dataset::Dataset;
use crate::storage::RunContext;

/// Full run over a local delimited file.
///
/// Persists raw, staging, and final artifacts under a fresh
/// timestamped directory below `root`. Returns the cleaned dataset, or
/// absence when any stage came up empty.
pub fn run_from_file(input: &Path, root: &Path) -> Option<Dataset> {
    let run = create_run(root)?;
    let raw = acquire::load_csv_file(input, Some(&run));
    clean::clean(raw, Some(&run))
}

/// Full run over a single database query.
pub async fn run_from_query(query: &str, root: &Path) -> Option<Dataset> {
    let run = create_run(root)?;
    let raw = acquire::load_query_from_env(query, Some(&run)).await;
    clean::clean(raw, Some(&run))
}

fn create_run(root: &Path) -> Option<RunContext> {
    match RunContext::create(root) {
        Ok(run) => Some(run),
        Err(err) => {
            error!(root = %root.display(), "could not create run output directory: {err}");
            None
        }
    }
}
