//! Process-wide logging setup.
//!
//! Installed exactly once at binary startup: a console layer plus a
//! non-blocking file layer writing `data_pipeline.log`, both behind one
//! shared level filter. The returned [`WorkerGuard`] must be held for
//! the life of the process so buffered file output flushes on exit.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name inside the log directory.
pub const LOG_FILE: &str = "data_pipeline.log";

/// Install the global subscriber.
///
/// `default_level` applies to console and file alike unless `RUST_LOG`
/// overrides it. Creating the log directory is idempotent.
pub fn init(log_dir: &Path, default_level: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer().with_target(true);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(dir = %log_dir.display(), file = LOG_FILE, "logging setup complete");
    Ok(guard)
}
