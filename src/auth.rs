//! Credential provider: token acquisition and per-run persistence.
//!
//! The silent path reuses a cached token record when one exists for the
//! configured username and has not expired; otherwise a fresh token is
//! obtained from the identity provider's `oauth2/v2.0/token` endpoint with
//! the resource-owner flow (username/password) or, when no username is
//! configured, the client-credential flow. The obtained record is written
//! under a per-run random file name so concurrent process invocations sharing
//! the same temp directory cannot collide.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::TransferError;
use crate::load_config::SharePointParams;

/// Scopes requested for the document-library session.
pub const SCOPES: [&str; 2] = ["Files.ReadWrite.All", "offline_access"];

const CACHE_FILE_NAME: &str = "token_cache.json";

/// Safety margin subtracted from the reported token lifetime.
const EXPIRY_SLACK_SECS: u64 = 60;

/// Per-run context: a generated run id and the temp directory holding token
/// state. Passed explicitly to the components that persist or read tokens.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub temp_dir: PathBuf,
}

impl RunContext {
    /// Build the context for `data_dir`, creating `<data_dir>/temp` if absent.
    pub fn create(data_dir: &Path) -> Result<Self, TransferError> {
        let temp_dir = data_dir.join("temp");
        fs::create_dir_all(&temp_dir)?;
        let run_id = Uuid::new_v4();
        debug!(run_id = %run_id, temp_dir = %temp_dir.display(), "Run context created");
        Ok(RunContext { run_id, temp_dir })
    }

    /// Where this run's token record is written.
    pub fn token_path(&self) -> PathBuf {
        self.temp_dir.join(self.run_id.to_string())
    }

    fn cache_path(&self) -> PathBuf {
        self.temp_dir.join(CACHE_FILE_NAME)
    }
}

/// An acquired token plus the metadata needed for silent reuse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Unix timestamp stamped at acquisition time.
    #[serde(default)]
    pub acquired_at: Option<u64>,
}

impl TokenRecord {
    pub fn is_expired(&self, now_unix: u64) -> bool {
        match (self.acquired_at, self.expires_in) {
            (Some(acquired), Some(lifetime)) => {
                now_unix + EXPIRY_SLACK_SECS >= acquired + lifetime
            }
            // Without expiry metadata the record cannot be trusted silently.
            _ => true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedAccount {
    username: String,
    record: TokenRecord,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Acquire a token for the document-library scopes and persist it for the run.
///
/// Silent path first, then direct exchange. Both failing is a
/// [`TransferError::Auth`].
pub async fn acquire_token(
    http: &reqwest::Client,
    params: &SharePointParams,
    ctx: &RunContext,
) -> Result<TokenRecord, TransferError> {
    let record = match cached_token(ctx, params.username.as_deref()) {
        Some(record) => {
            info!("Cached token found for account, reusing it");
            record
        }
        None => {
            info!("No suitable token in cache, requesting a new one from the identity provider");
            let record = request_token(http, params).await?;
            store_cached_token(ctx, params.username.as_deref(), &record);
            record
        }
    };

    persist_run_token(ctx, &record)?;
    Ok(record)
}

/// Cached record for the configured username, if present and still valid.
fn cached_token(ctx: &RunContext, username: Option<&str>) -> Option<TokenRecord> {
    let cache_path = ctx.cache_path();
    let content = fs::read_to_string(&cache_path).ok()?;
    let cached: CachedAccount = serde_json::from_str(&content).ok()?;
    if Some(cached.username.as_str()) != username {
        debug!("Cached account does not match configured username");
        return None;
    }
    if cached.record.is_expired(now_unix()) {
        debug!("Cached token is expired");
        return None;
    }
    Some(cached.record)
}

fn store_cached_token(ctx: &RunContext, username: Option<&str>, record: &TokenRecord) {
    let Some(username) = username else {
        return;
    };
    let cached = CachedAccount {
        username: username.to_string(),
        record: record.clone(),
    };
    match serde_json::to_string(&cached) {
        Ok(json) => {
            if let Err(e) = fs::write(ctx.cache_path(), json) {
                warn!(error = %e, "Failed to write token cache, continuing without it");
            }
        }
        Err(e) => warn!(error = %e, "Failed to serialize token cache entry"),
    }
}

/// Direct token exchange against `<authority>/<tenant>/oauth2/v2.0/token`.
async fn request_token(
    http: &reqwest::Client,
    params: &SharePointParams,
) -> Result<TokenRecord, TransferError> {
    let token_url = format!(
        "{}/{}/oauth2/v2.0/token",
        params.authority.trim_end_matches('/'),
        params.tenant_id
    );

    let scope = SCOPES.join(" ");
    let mut form: Vec<(&str, String)> = vec![("client_id", params.client_id.clone())];
    match (&params.username, &params.password) {
        (Some(username), Some(password)) => {
            form.push(("grant_type", "password".to_string()));
            form.push(("scope", scope));
            form.push(("username", username.clone()));
            form.push(("password", password.clone()));
            if let Some(secret) = &params.client_secret {
                form.push(("client_secret", secret.clone()));
            }
        }
        _ => {
            let secret = params.client_secret.clone().ok_or_else(|| {
                TransferError::Auth(
                    "Neither username/password nor a client secret is configured".into(),
                )
            })?;
            form.push(("grant_type", "client_credentials".to_string()));
            form.push(("scope", "https://graph.microsoft.com/.default".to_string()));
            form.push(("client_secret", secret));
        }
    }

    let response = http
        .post(&token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| TransferError::Auth(format!("Token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<TokenErrorResponse>()
            .await
            .map(|e| e.error_description.unwrap_or(e.error))
            .unwrap_or_else(|_| status.to_string());
        return Err(TransferError::Auth(format!(
            "Cannot retrieve token: {detail}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| TransferError::Auth(format!("Malformed token response: {e}")))?;
    if token.access_token.is_empty() {
        return Err(TransferError::Auth("Cannot retrieve token.".into()));
    }

    info!("Token acquired from identity provider");
    Ok(TokenRecord {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        scope: token.scope,
        acquired_at: Some(now_unix()),
    })
}

/// Serialize the record to the run's uniquely named token file.
fn persist_run_token(ctx: &RunContext, record: &TokenRecord) -> Result<(), TransferError> {
    let token_path = ctx.token_path();
    let json = serde_json::to_string(record)?;
    fs::write(&token_path, json)?;
    debug!(token_path = %token_path.display(), "Token record written");
    Ok(())
}
