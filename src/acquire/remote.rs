//! Remote dataset download through the external Kaggle-style CLI.
//!
//! This is a shell-out integration point: the tool is expected to exit
//! zero and place a dataset-specific file at the destination. Download
//! is idempotent by destination directory. There is no detection of
//! partial or corrupt downloads beyond checking that the expected file
//! exists, and no timeout; the call blocks until the tool exits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::{DownloadTool, RemoteDataset};
use crate::error::{FetchError, FetchResult};

/// Invoke the download tool and verify the expected file landed.
pub async fn try_fetch_remote(
    tool: &DownloadTool,
    dataset: &RemoteDataset,
    dest: &Path,
) -> FetchResult<PathBuf> {
    fs::create_dir_all(dest)?;

    info!(
        dataset = %dataset.slug,
        dest = %dest.display(),
        command = %tool.command,
        "attempting to download dataset"
    );

    let output = Command::new(&tool.command)
        .arg("datasets")
        .arg("download")
        .arg("-d")
        .arg(&dataset.slug)
        .arg("-p")
        .arg(dest)
        .arg("--unzip")
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::ToolNotFound {
                command: tool.command.clone(),
                source: e,
            },
            _ => FetchError::Io(e),
        })?;

    if !output.status.success() {
        return Err(FetchError::ToolFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    info!(dataset = %dataset.slug, "download tool finished");
    debug!(stdout = %String::from_utf8_lossy(&output.stdout), "download tool output");

    let expected = dest.join(&dataset.expected_file);
    if expected.exists() {
        info!(file = %expected.display(), "expected dataset file found");
        Ok(expected)
    } else {
        Err(FetchError::MissingArtifact {
            expected: dataset.expected_file.clone(),
            found: list_dir(dest),
        })
    }
}

/// Boundary operation: fetch, log any failure, return absence on error.
pub async fn fetch_remote(
    tool: &DownloadTool,
    dataset: &RemoteDataset,
    dest: &Path,
) -> Option<PathBuf> {
    match try_fetch_remote(tool, dataset, dest).await {
        Ok(path) => Some(path),
        Err(FetchError::MissingArtifact { expected, found }) => {
            error!(%expected, "expected file not found after download and unzip");
            debug!(?found, dest = %dest.display(), "files at destination");
            None
        }
        Err(FetchError::ToolNotFound { command, source }) => {
            error!(%command, %source, "download tool not found, ensure it is installed and on PATH");
            None
        }
        Err(err) => {
            error!("error downloading dataset: {err}");
            None
        }
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
