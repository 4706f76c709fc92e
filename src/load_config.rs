//! `load_config` module: loads the platform's `config.json` and adapts it into
//! the typed [`TransferConfig`] the rest of the crate consumes.
//!
//! This is the only place where untrusted JSON is parsed and mapped to rich,
//! strongly-typed internal structs. Secret fields use the platform's
//! `#`-prefixed key names (`#client_secret`, `#password`) via serde renames.
//!
//! # Errors
//! Missing required sections/keys and unknown `operation_type` values are
//! reported as [`TransferError::Config`] naming the offending key, before any
//! network activity takes place.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use chrono::NaiveDate;

use crate::dates::{self, DateFormat};
use crate::error::TransferError;

/// Identity-provider credentials for token acquisition.
#[derive(Debug, Clone, Deserialize)]
pub struct SharePointParams {
    pub client_id: String,
    #[serde(rename = "#client_secret", default)]
    pub client_secret: Option<String>,
    pub tenant_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "#password", default)]
    pub password: Option<String>,
    pub authority: String,
}

/// Site/drive resolution credentials and target site locator.
#[derive(Debug, Clone, Deserialize)]
pub struct O365Params {
    pub client_id: String,
    #[serde(rename = "#client_secret")]
    pub client_secret: String,
    pub tenant_id: String,
    pub hostname: String,
    pub url: String,
}

/// Transfer direction for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Upload,
    Download,
}

impl OperationType {
    fn parse(raw: &str) -> Result<Self, TransferError> {
        match raw {
            "upload" => Ok(OperationType::Upload),
            "download" => Ok(OperationType::Download),
            other => Err(TransferError::Config(format!(
                "Invalid operation type: {other}"
            ))),
        }
    }
}

/// Which processing dates the run covers.
#[derive(Debug, Clone)]
pub enum DateSelection {
    /// `date_of_processing`; `None` means today.
    Single(Option<String>),
    /// `date_from`/`date_to`, iterated `[from, to)`.
    Range { from: String, to: String },
}

impl DateSelection {
    /// Resolve the configured expressions into concrete ascending dates.
    pub fn resolve(&self, today: NaiveDate) -> Result<Vec<NaiveDate>, TransferError> {
        match self {
            DateSelection::Single(expr) => {
                let date = match expr {
                    Some(expr) => dates::parse_date_expression(expr, today)?,
                    None => today,
                };
                Ok(vec![date])
            }
            DateSelection::Range { from, to } => {
                let from = dates::parse_date_expression(from, today)?;
                let to = dates::parse_date_expression(to, today)?;
                Ok(dates::dates_between(from, to))
            }
        }
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub sharepoint: SharePointParams,
    pub o365: O365Params,
    pub main_folder_path: String,
    pub operation: OperationType,
    pub dates: DateSelection,
    pub filter_day: bool,
    pub folder_suffix: Option<String>,
    pub filename_prefix: Option<String>,
    pub file_tags: Vec<String>,
    pub date_format: DateFormat,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    sharepoint: Option<SharePointParams>,
    #[serde(default)]
    o365: Option<O365Params>,
    #[serde(default)]
    main_folder_path: Option<String>,
    #[serde(default)]
    operation_type: Option<String>,
    #[serde(default)]
    date_from: Option<String>,
    #[serde(default)]
    date_to: Option<String>,
    #[serde(default)]
    date_of_processing: Option<String>,
    #[serde(default)]
    filter_day: bool,
    #[serde(default)]
    folder_suffix: Option<String>,
    #[serde(default)]
    filename_prefix: Option<String>,
    #[serde(default)]
    file_tags: Vec<String>,
    #[serde(default)]
    date_format: DateFormat,
}

fn required<T>(value: Option<T>, key: &str) -> Result<T, TransferError> {
    value.ok_or_else(|| {
        TransferError::Config(format!("Missing required configuration parameter: {key}"))
    })
}

/// Load and validate `<data_dir>/config.json`.
pub fn load_config(data_dir: &Path) -> Result<TransferConfig, TransferError> {
    let config_path = data_dir.join("config.json");
    info!(config_path = ?config_path, "Loading configuration from file");

    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?config_path, "Failed to read config file");
            return Err(TransferError::Config(format!(
                "Failed to read config file {}: {e}",
                config_path.display()
            )));
        }
    };

    let raw: RawConfig = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = ?e, config_path = ?config_path, "Failed to parse config JSON");
            return Err(TransferError::Config(format!(
                "Failed to parse config JSON: {e}"
            )));
        }
    };

    let sharepoint = required(raw.sharepoint, "sharepoint")?;
    let o365 = required(raw.o365, "o365")?;
    let main_folder_path = required(raw.main_folder_path, "main_folder_path")?;
    let operation = OperationType::parse(&required(raw.operation_type, "operation_type")?)?;

    let dates = match (raw.date_of_processing, raw.date_from, raw.date_to) {
        (Some(expr), _, _) => DateSelection::Single(Some(expr)),
        (None, Some(from), Some(to)) => DateSelection::Range { from, to },
        (None, Some(_), None) => {
            return Err(TransferError::Config(
                "Missing required configuration parameter: date_to".into(),
            ))
        }
        (None, None, Some(_)) => {
            return Err(TransferError::Config(
                "Missing required configuration parameter: date_from".into(),
            ))
        }
        (None, None, None) => DateSelection::Single(None),
    };

    info!(
        operation = ?operation,
        main_folder_path = %main_folder_path,
        "Configuration loaded"
    );

    Ok(TransferConfig {
        sharepoint,
        o365,
        main_folder_path,
        operation,
        dates,
        filter_day: raw.filter_day,
        folder_suffix: raw.folder_suffix,
        filename_prefix: raw.filename_prefix,
        file_tags: raw.file_tags,
        date_format: raw.date_format,
    })
}
