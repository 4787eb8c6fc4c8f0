//! Object storage client.
//!
//! Uploads listing photos into a public bucket and renders the public URLs
//! the catalog stores on each item row.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::error_message;
use crate::config::BackendConfig;

/// Errors from the storage API.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse storage API response: {0}")]
    Parse(String),
}

/// Client for the storage API.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl StorageClient {
    /// Create a new storage API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the API key is
    /// not a valid header value.
    pub fn new(config: &BackendConfig) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| StorageError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Upload an object into a bucket.
    ///
    /// Writes ride on the caller's access token when one is supplied so
    /// bucket policies see the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, access_token, bytes), fields(bucket, path, size = bytes.len()))]
    pub async fn upload(
        &self,
        access_token: Option<&SecretString>,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let bearer = access_token.map_or_else(
            || self.inner.api_key.expose_secret().to_string(),
            |token| token.expose_secret().to_string(),
        );
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(bearer)
            .header("Content-Type", content_type.to_string())
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(())
    }

    /// The public URL an uploaded object is served from.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.inner.base_url
        )
    }
}
