//! Output manifest records for downloaded files.
//!
//! The host pipeline picks up each downloaded file through a sidecar
//! `<name>.manifest` JSON carrying its tags: the fixed domain tag plus a
//! provenance tag recording the remote source path.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::TransferError;

pub const DOMAIN_TAG: &str = "chatbot_analytics";
pub const SOURCE_PATH_TAG_PREFIX: &str = "source_path:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub tags: Vec<String>,
}

impl ManifestEntry {
    /// Manifest entry for a file downloaded from `remote_path`.
    pub fn for_download(name: &str, remote_path: &str) -> Self {
        ManifestEntry {
            name: name.to_string(),
            tags: vec![
                DOMAIN_TAG.to_string(),
                format!("{SOURCE_PATH_TAG_PREFIX}{remote_path}"),
            ],
        }
    }

    /// Write the sidecar manifest next to the output file, returning its path.
    pub fn write(&self, out_dir: &Path) -> Result<PathBuf, TransferError> {
        let manifest_path = out_dir.join(format!("{}.manifest", self.name));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&manifest_path, json)?;
        debug!(manifest = %manifest_path.display(), "Wrote output manifest");
        Ok(manifest_path)
    }
}
