//! CLI interface: command parsing and the async entrypoint.
//!
//! All business logic lives in the library modules; this module is strictly
//! CLI glue. Integration tests call [`run`] with a constructed [`Cli`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::TransferError;
use crate::runner;

/// CLI for sharepoint-transfer: move pipeline staging files to and from
/// date-named SharePoint folders.
#[derive(Parser)]
#[clap(
    name = "sharepoint-transfer",
    version,
    about = "Upload or download pipeline files against date-named SharePoint document-library folders"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured transfer using `<data-dir>/config.json`
    Run {
        /// Path to the pipeline data directory (config.json, in/, out/, temp/)
        #[clap(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<(), TransferError> {
    match cli.command {
        Commands::Run { data_dir } => {
            tracing::info!(data_dir = %data_dir.display(), command = "run", "Starting transfer run");
            runner::run_transfer(&data_dir).await
        }
    }
}
