//! Clients for the hosted backend service.
//!
//! The backend exposes three REST surfaces under one base URL, and each gets
//! its own client here:
//!
//! - `/auth/v1` - account management ([`AuthClient`])
//! - `/rest/v1` - row CRUD with query-string filters ([`DataClient`])
//! - `/storage/v1` - object storage for listing photos ([`StorageClient`])
//!
//! Every request carries the project's publishable key in an `apikey` header;
//! row and storage requests additionally send a bearer token (the signed-in
//! user's access token, or the publishable key again when anonymous) that the
//! backend uses for row-level authorization.

pub mod auth;
pub mod data;
pub mod rows;
pub mod storage;

pub use auth::{AuthClient, AuthError, AuthSession, AuthUser, SignUpResult};
pub use data::DataClient;
pub use storage::{StorageClient, StorageError};

use thiserror::Error;

/// Errors that can occur when talking to the row API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Extract the human-readable message from an error response body.
///
/// The row API reports errors as `{"message": …, "code": …, "details": …}`;
/// the auth and storage surfaces use `{"msg": …}` or `{"error_description": …}`.
/// Falls back to the raw body when none of those fields are present.
pub(crate) fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        msg: Option<String>,
        error_description: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .message
                .or(parsed.msg)
                .or(parsed.error_description)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
