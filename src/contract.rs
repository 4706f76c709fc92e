//! # Drive contract: interface between the transfer logic and remote storage
//!
//! This module defines a single trait ([`DriveClient`]) and the plain data
//! types the reconciler exchanges with it. The production implementation
//! talks to the Microsoft Graph API ([`crate::graph::GraphDriveClient`]);
//! tests use the generated `MockDriveClient`.
//!
//! ## Interface & Extensibility
//! - Implement [`DriveClient`] to target another document-library backend.
//! - All methods are async and return [`DriveError`] on failure.
//! - Lookups and folder creation return tagged outcomes ([`Lookup`],
//!   [`FolderCreation`]) instead of smuggling "not found" / "already exists"
//!   through the error channel; the reconciler consumes those states directly.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, exported under the
//!   `test-export-mocks` feature so integration tests can build
//!   deterministic drive fixtures without any network.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::DriveError;

/// What kind of entry a drive item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
}

/// A resolved item on the drive, addressed by id and drive-root-relative path.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    /// Drive-root-relative path with a leading `/`.
    pub path: String,
    pub kind: ItemKind,
    pub size: Option<u64>,
}

impl DriveItem {
    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }
}

/// Outcome of a path lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(DriveItem),
    NotFound,
}

/// Outcome of a child-folder creation attempt.
#[derive(Debug, Clone)]
pub enum FolderCreation {
    Created(DriveItem),
    AlreadyExists,
}

/// Async interface to a path-addressable document library.
///
/// Implementors own the drive binding (which site, which library); callers
/// address everything by drive-root-relative path or by previously resolved
/// [`DriveItem`]s.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// Look up an item by path. `/` addresses the drive root.
    async fn lookup_item(&self, path: &str) -> Result<Lookup, DriveError>;

    /// Create a child folder under `parent_path` (`/` for the drive root).
    ///
    /// An existing folder of the same name reports
    /// [`FolderCreation::AlreadyExists`] rather than an error.
    async fn create_folder(
        &self,
        parent_path: &str,
        name: &str,
    ) -> Result<FolderCreation, DriveError>;

    /// Upload a local file into `folder` under `file_name`, replacing any
    /// existing remote file of that name.
    async fn upload_file(
        &self,
        folder: &DriveItem,
        local_path: &Path,
        file_name: &str,
    ) -> Result<DriveItem, DriveError>;

    /// List the direct children of `folder`.
    async fn list_children(&self, folder: &DriveItem) -> Result<Vec<DriveItem>, DriveError>;

    /// Download a file item into `dest_dir`, returning the written path.
    async fn download_file(
        &self,
        item: &DriveItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, DriveError>;
}
