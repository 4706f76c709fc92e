//! Error taxonomy for the transfer component.
//!
//! Two layers: [`DriveError`] classifies remote/storage failures coming out of
//! the drive client, [`TransferError`] is the run-level type every public
//! operation returns. The binary maps [`TransferError::is_user_error`] onto
//! the platform's exit-code contract (1 for user-facing problems, 2 for
//! everything else).

use thiserror::Error;

/// Failures surfaced by a [`crate::contract::DriveClient`] implementation.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The addressed item does not exist on the drive.
    #[error("Remote item not found: {path}")]
    NotFound { path: String },

    /// The remote rejected the operation because the target already exists.
    #[error("Remote conflict at {path}: {message}")]
    Conflict { path: String, message: String },

    /// The API answered with a non-success status outside the tolerated ones.
    #[error("Graph API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before any API answer was received.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem failure while staging an upload or download.
    #[error("Local I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run-level error type.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unsupported date expression: {0}")]
    DateParse(String),

    #[error(transparent)]
    Remote(#[from] DriveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TransferError {
    /// Whether the error is the user's to fix (bad config, bad credentials,
    /// bad date expression) as opposed to an internal/remote failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TransferError::Config(_) | TransferError::Auth(_) | TransferError::DateParse(_)
        )
    }

    /// Process exit code under the platform contract: 1 user-facing, 2 internal.
    pub fn exit_code(&self) -> i32 {
        if self.is_user_error() {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_exit_with_one() {
        assert_eq!(TransferError::Config("missing key".into()).exit_code(), 1);
        assert_eq!(TransferError::Auth("bad token".into()).exit_code(), 1);
        assert_eq!(TransferError::DateParse("not-a-date".into()).exit_code(), 1);
    }

    #[test]
    fn remote_and_io_errors_exit_with_two() {
        let remote = TransferError::Remote(DriveError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(remote.exit_code(), 2);
        assert!(!remote.is_user_error());

        let io = TransferError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.exit_code(), 2);
    }
}
