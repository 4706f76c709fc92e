//! Local input catalog for uploads.
//!
//! Input files live flat under `<data_dir>/in/files`. A file may carry a
//! sidecar `<name>.manifest` JSON with descriptive tags assigned by the host
//! pipeline; the sidecars themselves are never uploaded.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use chrono::NaiveDate;

use crate::dates;
use crate::error::TransferError;
use crate::load_config::TransferConfig;

const MANIFEST_SUFFIX: &str = ".manifest";

/// One candidate file from the staging directory.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SidecarManifest {
    #[serde(default)]
    tags: Vec<String>,
}

/// List the staged input files in catalog (name) order, with sidecar tags.
pub fn list_input_files(in_dir: &Path) -> Result<Vec<InputFile>, TransferError> {
    if !in_dir.exists() {
        debug!(dir = %in_dir.display(), "Input directory does not exist, no files staged");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(in_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(MANIFEST_SUFFIX) {
            continue;
        }
        let tags = read_sidecar_tags(&entry.path());
        files.push(InputFile {
            name,
            path: entry.path(),
            tags,
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn read_sidecar_tags(file_path: &Path) -> Vec<String> {
    let mut manifest_path = file_path.as_os_str().to_owned();
    manifest_path.push(MANIFEST_SUFFIX);
    let manifest_path = PathBuf::from(manifest_path);
    if !manifest_path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(&manifest_path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<SidecarManifest>(&s).map_err(|e| e.to_string()))
    {
        Ok(manifest) => manifest.tags,
        Err(e) => {
            warn!(manifest = %manifest_path.display(), error = %e, "Ignoring unreadable sidecar manifest");
            Vec::new()
        }
    }
}

/// Apply the configured upload filters for one processing date.
///
/// `filename_prefix` and `file_tags` narrow the candidate set; `filter_day`
/// keeps only files whose embedded date equals the day before the processing
/// date. Each surviving file is uploaded exactly once.
pub fn select_for_upload(
    files: &[InputFile],
    config: &TransferConfig,
    processing_date: NaiveDate,
) -> Vec<InputFile> {
    let wanted_date = dates::previous_day(processing_date);
    files
        .iter()
        .filter(|file| match &config.filename_prefix {
            Some(prefix) => file.name.starts_with(prefix.as_str()),
            None => true,
        })
        .filter(|file| {
            config.file_tags.is_empty()
                || file.tags.iter().any(|t| config.file_tags.contains(t))
        })
        .filter(|file| {
            if !config.filter_day {
                return true;
            }
            match dates::extract_embedded_date(&file.name) {
                Some(embedded) => embedded == wanted_date,
                None => false,
            }
        })
        .cloned()
        .collect()
}
