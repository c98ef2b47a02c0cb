//! HTTP-backed blob store adapter.
//!
//! Objects are uploaded with a fresh UUID-derived name so concurrent uploads
//! of files with the same client-side name never collide, and so removing a
//! blob by URL never races a newer upload reusing the name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BlobStore, BlobStoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the blob store endpoint.
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    base_url: String,
    token: Option<String>,
}

impl BlobStoreConfig {
    /// Create a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Blob store adapter talking to an object-storage endpoint over HTTP.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: Client,
    config: BlobStoreConfig,
}

impl HttpBlobStore {
    /// Build the adapter from its configuration.
    pub fn new(config: BlobStoreConfig) -> Result<Self, BlobStoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| BlobStoreError::connection(err.to_string()))?;
        Ok(Self { client, config })
    }

    fn object_url(&self, object_name: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            object_name
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Derive the stored object name: a fresh UUID keeping the original
/// extension so content types remain guessable from the URL.
fn object_name_for(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
            format!("{id}.{extension}")
        }
        _ => id.to_string(),
    }
}

fn map_send_error(err: reqwest::Error) -> BlobStoreError {
    if err.is_status() {
        BlobStoreError::upstream(err.to_string())
    } else {
        BlobStoreError::connection(err.to_string())
    }
}

fn reject_error_status(status: StatusCode, url: &str) -> Result<(), BlobStoreError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(BlobStoreError::upstream(format!(
            "{url} returned {status}"
        )))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn store(&self, bytes: &[u8], file_name: &str) -> Result<String, BlobStoreError> {
        let url = self.object_url(&object_name_for(file_name));

        let response = self
            .authorize(self.client.put(&url))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(map_send_error)?;
        reject_error_status(response.status(), &url)?;

        debug!(url, size = bytes.len(), "stored blob");
        Ok(url)
    }

    async fn remove(&self, url: &str) -> Result<(), BlobStoreError> {
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(map_send_error)?;

        // A blob already gone is a success for compensation purposes.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(url, "blob already removed");
            return Ok(());
        }
        reject_error_status(response.status(), url)?;

        debug!(url, "removed blob");
        Ok(())
    }
}
