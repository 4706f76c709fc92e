//! Run orchestration: configuration → authentication → drive resolution →
//! per-date reconciliation, strictly in that order and strictly sequential.

use chrono::Local;
use std::path::Path;
use tracing::info;

use crate::auth::{self, RunContext};
use crate::error::TransferError;
use crate::graph::{self, GraphDriveClient, GraphSession};
use crate::load_config::load_config;
use crate::transfer::{self, DataDirs};

/// Execute one configured transfer run against `data_dir`.
pub async fn run_transfer(data_dir: &Path) -> Result<(), TransferError> {
    let config = load_config(data_dir)?;
    let ctx = RunContext::create(data_dir)?;

    let http = reqwest::Client::new();
    let token = auth::acquire_token(&http, &config.sharepoint, &ctx).await?;
    let session = GraphSession::connect(http, &token)?;
    let drive = graph::resolve_drive(&session, &config.o365).await?;
    let client = GraphDriveClient::new(session, drive);

    let today = Local::now().date_naive();
    let dates = config.dates.resolve(today)?;
    let dirs = DataDirs::new(data_dir);

    let mut transferred = 0;
    for date in dates {
        info!(date = %date, "Processing date");
        transferred += transfer::process_date(&client, &config, &dirs, date).await?;
    }
    info!(transferred, "Transfer run complete");
    Ok(())
}
