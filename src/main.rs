//! Telco Insights CLI - staged churn data preparation
//!
//! ```bash
//! telco-insights fetch                         # Download the dataset via the Kaggle CLI
//! telco-insights run data/churn.csv            # Clean a local CSV end to end
//! telco-insights run-db --query "SELECT ..."   # Clean a PostgreSQL query result
//! ```
//!
//! Database credentials come from the environment (or a `.env` file):
//! `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`. The
//! download tool defaults to `kaggle` on `PATH` (`KAGGLE_CLI` overrides).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use telco_insights::{
    acquire, config::{DownloadTool, RemoteDataset},
    logging, pipeline, PipelineError,
};

#[derive(Parser)]
#[command(name = "telco-insights")]
#[command(about = "Staged ETL pipeline for the Telco customer churn dataset", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory for the pipeline log file
    #[arg(long, default_value = "logs", global = true)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the churn dataset with the external download tool
    Fetch {
        /// Dataset slug passed to the download tool
        #[arg(long)]
        dataset: Option<String>,

        /// File name expected at the destination after unzip
        #[arg(long)]
        expected_file: Option<String>,

        /// Destination directory
        #[arg(short, long, default_value = "data/raw")]
        dest: PathBuf,
    },

    /// Run the full pipeline over a local CSV file
    Run {
        /// Input CSV file
        input: PathBuf,

        /// Root directory for run output
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Run the full pipeline over a single database query
    RunDb {
        /// SQL query producing the raw dataset
        #[arg(long)]
        query: String,

        /// Root directory for run output
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Held for the life of the process so file logging flushes on exit.
    let _guard = match logging::init(&cli.log_dir, level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("❌ Could not set up logging: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Fetch {
            dataset,
            expected_file,
            dest,
        } => cmd_fetch(dataset, expected_file, dest).await,

        Commands::Run { input, root } => cmd_run(&input, &root),

        Commands::RunDb { query, root } => cmd_run_db(&query, &root).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn cmd_fetch(
    dataset: Option<String>,
    expected_file: Option<String>,
    dest: PathBuf,
) -> Result<(), PipelineError> {
    let tool = DownloadTool::from_env();
    let mut remote = RemoteDataset::telco_churn();
    if let Some(slug) = dataset {
        remote.slug = slug;
    }
    if let Some(expected) = expected_file {
        remote.expected_file = expected;
    }

    let path = acquire::try_fetch_remote(&tool, &remote, &dest).await?;
    println!("✅ Downloaded: {}", path.display());
    Ok(())
}

fn cmd_run(input: &Path, root: &Path) -> Result<(), PipelineError> {
    let cleaned = pipeline::run_from_file(input, root).ok_or(PipelineError::Aborted)?;
    let (rows, columns) = cleaned.shape();
    println!("✨ Cleaned dataset: {rows} rows x {columns} columns");
    Ok(())
}

async fn cmd_run_db(query: &str, root: &Path) -> Result<(), PipelineError> {
    let cleaned = pipeline::run_from_query(query, root)
        .await
        .ok_or(PipelineError::Aborted)?;
    let (rows, columns) = cleaned.shape();
    println!("✨ Cleaned dataset: {rows} rows x {columns} columns");
    Ok(())
}
