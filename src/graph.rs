//! Microsoft Graph implementation of the drive contract.
//!
//! [`GraphSession`] wraps an authenticated `reqwest` client; [`resolve_drive`]
//! performs the two-step site → default-document-library lookup; and
//! [`GraphDriveClient`] implements [`DriveClient`] over the five drive
//! operations the reconciler needs. All transport and serialization details
//! stay inside this module.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::auth::TokenRecord;
use crate::contract::{DriveClient, DriveItem, FolderCreation, ItemKind, Lookup};
use crate::error::{DriveError, TransferError};
use crate::load_config::O365Params;

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// An authenticated Graph session.
#[derive(Debug, Clone)]
pub struct GraphSession {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GraphSession {
    /// Build a session from an acquired token record.
    ///
    /// Fails when the record carries no usable access token.
    pub fn connect(http: reqwest::Client, token: &TokenRecord) -> Result<Self, TransferError> {
        if token.access_token.is_empty() {
            return Err(TransferError::Auth("Cannot authenticate account".into()));
        }
        Ok(GraphSession {
            http,
            access_token: token.access_token.clone(),
            base_url: GRAPH_BASE.to_string(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.put(url).bearer_auth(&self.access_token)
    }
}

/// The resolved document library a run operates against.
#[derive(Debug, Clone)]
pub struct DriveHandle {
    pub site_id: String,
    pub drive_id: String,
}

#[derive(Debug, Deserialize)]
struct SiteResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DriveResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiDriveItem {
    id: String,
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    file: Option<serde_json::Value>,
    #[serde(default)]
    folder: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChildrenPage {
    #[serde(default)]
    value: Vec<ApiDriveItem>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

impl ApiDriveItem {
    fn into_item(self, path: String) -> DriveItem {
        // Only items carrying the file facet count as files; folders and
        // facet-less specials (notebooks, packages) are never downloaded.
        let kind = if self.file.is_some() && self.folder.is_none() {
            ItemKind::File
        } else {
            ItemKind::Folder
        };
        DriveItem {
            id: self.id,
            name: self.name,
            path,
            kind,
            size: self.size,
        }
    }
}

/// Join a drive-root-relative parent path and a child name.
fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Resolve the target site and its default document library.
pub async fn resolve_drive(
    session: &GraphSession,
    o365: &O365Params,
) -> Result<DriveHandle, TransferError> {
    let site_path = if o365.url.starts_with('/') {
        o365.url.clone()
    } else {
        format!("/{}", o365.url)
    };
    let site_url = format!("{}/sites/{}:{}", session.base_url, o365.hostname, site_path);
    info!(hostname = %o365.hostname, site = %site_path, "Resolving SharePoint site");

    let response = session.get(&site_url).send().await.map_err(DriveError::from)?;
    let site: SiteResponse = parse_or_error(response, &site_path).await?;
    debug!(site_id = %site.id, "Site resolved");

    let drive_url = format!("{}/sites/{}/drive", session.base_url, site.id);
    let response = session.get(&drive_url).send().await.map_err(DriveError::from)?;
    let drive: DriveResponse = parse_or_error(response, &site_path).await?;
    info!(drive_id = %drive.id, "Default document library resolved");

    Ok(DriveHandle {
        site_id: site.id,
        drive_id: drive.id,
    })
}

/// Decode a success body, or classify the error response.
async fn parse_or_error<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    path: &str,
) -> Result<T, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    Err(classify_error(status, path, response).await)
}

async fn classify_error(
    status: reqwest::StatusCode,
    path: &str,
    response: reqwest::Response,
) -> DriveError {
    let message = match response.json::<ApiErrorEnvelope>().await {
        Ok(envelope) => {
            if envelope.error.message.is_empty() {
                envelope.error.code
            } else {
                envelope.error.message
            }
        }
        Err(_) => status.to_string(),
    };
    match status.as_u16() {
        404 => DriveError::NotFound {
            path: path.to_string(),
        },
        409 => DriveError::Conflict {
            path: path.to_string(),
            message,
        },
        code => DriveError::Api {
            status: code,
            message,
        },
    }
}

/// [`DriveClient`] over one resolved document library.
pub struct GraphDriveClient {
    session: GraphSession,
    drive: DriveHandle,
}

impl GraphDriveClient {
    pub fn new(session: GraphSession, drive: DriveHandle) -> Self {
        Self { session, drive }
    }

    fn item_by_path_url(&self, path: &str) -> String {
        if path == "/" {
            format!("{}/drives/{}/root", self.session.base_url, self.drive.drive_id)
        } else {
            format!(
                "{}/drives/{}/root:{}",
                self.session.base_url, self.drive.drive_id, path
            )
        }
    }

    fn children_url(&self, parent_path: &str) -> String {
        if parent_path == "/" {
            format!(
                "{}/drives/{}/root/children",
                self.session.base_url, self.drive.drive_id
            )
        } else {
            format!(
                "{}/drives/{}/root:{}:/children",
                self.session.base_url, self.drive.drive_id, parent_path
            )
        }
    }
}

#[async_trait]
impl DriveClient for GraphDriveClient {
    async fn lookup_item(&self, path: &str) -> Result<Lookup, DriveError> {
        debug!(path = %path, "Looking up drive item by path");
        let response = self.session.get(&self.item_by_path_url(path)).send().await?;
        match parse_or_error::<ApiDriveItem>(response, path).await {
            Ok(api_item) => Ok(Lookup::Found(api_item.into_item(path.to_string()))),
            Err(DriveError::NotFound { .. }) => {
                debug!(path = %path, "Drive item not found");
                Ok(Lookup::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_folder(
        &self,
        parent_path: &str,
        name: &str,
    ) -> Result<FolderCreation, DriveError> {
        let target = child_path(parent_path, name);
        info!(folder = %target, "Creating drive folder");
        let body = serde_json::json!({
            "name": name,
            "folder": {},
            "@microsoft.graph.conflictBehavior": "fail",
        });
        let response = self
            .session
            .post(&self.children_url(parent_path))
            .json(&body)
            .send()
            .await?;
        match parse_or_error::<ApiDriveItem>(response, &target).await {
            Ok(api_item) => Ok(FolderCreation::Created(api_item.into_item(target))),
            Err(DriveError::Conflict { .. }) => {
                debug!(folder = %target, "Folder already exists");
                Ok(FolderCreation::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    async fn upload_file(
        &self,
        folder: &DriveItem,
        local_path: &Path,
        file_name: &str,
    ) -> Result<DriveItem, DriveError> {
        let target = child_path(&folder.path, file_name);
        info!(file = %file_name, folder = %folder.path, "Uploading file");
        let content = tokio::fs::read(local_path).await?;
        let url = format!(
            "{}/drives/{}/items/{}:/{}:/content",
            self.session.base_url, self.drive.drive_id, folder.id, file_name
        );
        let response = self.session.put(&url).body(content).send().await?;
        let api_item = parse_or_error::<ApiDriveItem>(response, &target).await?;
        Ok(api_item.into_item(target))
    }

    async fn list_children(&self, folder: &DriveItem) -> Result<Vec<DriveItem>, DriveError> {
        debug!(folder = %folder.path, "Listing folder children");
        let mut url = format!(
            "{}/drives/{}/items/{}/children",
            self.session.base_url, self.drive.drive_id, folder.id
        );
        let mut items = Vec::new();
        loop {
            let response = self.session.get(&url).send().await?;
            let page = parse_or_error::<ChildrenPage>(response, &folder.path).await?;
            for api_item in page.value {
                let path = child_path(&folder.path, &api_item.name);
                items.push(api_item.into_item(path));
            }
            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }
        debug!(folder = %folder.path, count = items.len(), "Folder listed");
        Ok(items)
    }

    async fn download_file(
        &self,
        item: &DriveItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, DriveError> {
        info!(file = %item.name, "Downloading file");
        let url = format!(
            "{}/drives/{}/items/{}/content",
            self.session.base_url, self.drive.drive_id, item.id
        );
        let response = self.session.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify_error(status, &item.path, response).await);
        }
        let content = response.bytes().await?;
        let dest_path = dest_dir.join(&item.name);
        tokio::fs::write(&dest_path, &content).await?;
        debug!(path = %dest_path.display(), bytes = content.len(), "File written");
        Ok(dest_path)
    }
}
