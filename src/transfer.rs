//! The transfer reconciler: one upload or download pass per processing date.
//!
//! Upload ensures the destination folder chain exists (creating missing
//! segments idempotently) and pushes each selected staging file sequentially.
//! Download lists the date folder — skipping with a warning when it does not
//! exist — and writes one output manifest per downloaded file. Both paths are
//! fail-fast on anything other than the tolerated not-found/already-exists
//! states: the first real error aborts the date and the run.
//!
//! The reconciler is generic over [`DriveClient`], so tests drive it with the
//! generated mock instead of a live document library.

use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::contract::{DriveClient, DriveItem, FolderCreation, Lookup};
use crate::error::{DriveError, TransferError};
use crate::folder_path::{resolve_folder_path, segments};
use crate::input;
use crate::load_config::{OperationType, TransferConfig};
use crate::manifest::ManifestEntry;

/// Local directories one run reads from and writes to.
#[derive(Debug, Clone)]
pub struct DataDirs {
    pub in_files: std::path::PathBuf,
    pub out_files: std::path::PathBuf,
}

impl DataDirs {
    pub fn new(data_dir: &Path) -> Self {
        DataDirs {
            in_files: data_dir.join("in").join("files"),
            out_files: data_dir.join("out").join("files"),
        }
    }
}

/// Run the configured operation for one processing date.
///
/// Returns the number of files transferred for that date.
pub async fn process_date<C: DriveClient>(
    client: &C,
    config: &TransferConfig,
    dirs: &DataDirs,
    date: NaiveDate,
) -> Result<usize, TransferError> {
    let folder = resolve_folder_path(
        &config.main_folder_path,
        date,
        config.date_format,
        config.folder_suffix.as_deref(),
    );
    match config.operation {
        OperationType::Upload => upload_date(client, config, &dirs.in_files, date, &folder).await,
        OperationType::Download => download_date(client, &dirs.out_files, &folder).await,
    }
}

/// Upload every selected staging file into the date folder.
async fn upload_date<C: DriveClient>(
    client: &C,
    config: &TransferConfig,
    in_dir: &Path,
    date: NaiveDate,
    folder_path: &str,
) -> Result<usize, TransferError> {
    let files = input::list_input_files(in_dir)?;
    let selected = input::select_for_upload(&files, config, date);
    debug!(
        staged = files.len(),
        selected = selected.len(),
        folder = %folder_path,
        "Selected staging files for upload"
    );
    if selected.is_empty() {
        info!(folder = %folder_path, "No staging files qualify for this date");
        return Ok(0);
    }

    let folder = ensure_folder(client, folder_path).await?;
    let mut uploaded = 0;
    for file in &selected {
        info!(file = %file.name, folder = %folder_path, "Uploading file");
        client.upload_file(&folder, &file.path, &file.name).await?;
        uploaded += 1;
    }
    info!(folder = %folder_path, uploaded, "Upload complete for date");
    Ok(uploaded)
}

/// Fetch the folder, creating the full chain when it does not exist yet.
async fn ensure_folder<C: DriveClient>(
    client: &C,
    path: &str,
) -> Result<DriveItem, TransferError> {
    if let Lookup::Found(item) = client.lookup_item(path).await? {
        return Ok(item);
    }
    info!(folder = %path, "Folder does not exist, attempting to create it");
    create_folder_chain(client, path).await?;
    match client.lookup_item(path).await? {
        Lookup::Found(item) => Ok(item),
        Lookup::NotFound => Err(DriveError::NotFound {
            path: path.to_string(),
        }
        .into()),
    }
}

/// Create each missing segment of `path` from the drive root downwards.
///
/// Segments that already exist are tolerated, which makes repeated runs
/// against the same folder path idempotent.
async fn create_folder_chain<C: DriveClient>(
    client: &C,
    path: &str,
) -> Result<(), TransferError> {
    let mut current = String::new();
    for segment in segments(path) {
        let parent = if current.is_empty() {
            "/".to_string()
        } else {
            current.clone()
        };
        match client.create_folder(&parent, segment).await? {
            FolderCreation::Created(_) => info!(segment, "Subfolder created"),
            FolderCreation::AlreadyExists => info!(segment, "Subfolder already exists"),
        }
        current.push('/');
        current.push_str(segment);
    }
    Ok(())
}

/// Download every file in the date folder and emit its manifest entry.
async fn download_date<C: DriveClient>(
    client: &C,
    out_dir: &Path,
    folder_path: &str,
) -> Result<usize, TransferError> {
    let folder = match client.lookup_item(folder_path).await? {
        Lookup::Found(folder) => folder,
        Lookup::NotFound => {
            warn!(folder = %folder_path, "Folder not found on server");
            return Ok(0);
        }
    };

    std::fs::create_dir_all(out_dir)?;
    let mut downloaded = 0;
    for entry in client.list_children(&folder).await? {
        if !entry.is_file() {
            debug!(name = %entry.name, "Skipping non-file entry");
            continue;
        }
        info!(file = %entry.name, folder = %folder_path, "Downloading file");
        client.download_file(&entry, out_dir).await?;
        let remote_path = format!("{}/{}", folder_path, entry.name);
        ManifestEntry::for_download(&entry.name, &remote_path).write(out_dir)?;
        downloaded += 1;
    }
    info!(folder = %folder_path, downloaded, "Download complete for date");
    Ok(downloaded)
}
