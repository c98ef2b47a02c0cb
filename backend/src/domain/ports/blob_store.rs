//! Port for the external blob store holding material files.

use async_trait::async_trait;

/// Errors raised by blob store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobStoreError {
    /// The blob store endpoint could not be reached.
    #[error("blob store unreachable: {message}")]
    Connection { message: String },
    /// The blob store rejected the request.
    #[error("blob store rejected the request: {message}")]
    Upstream { message: String },
}

impl BlobStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// Port for storing and removing material blobs.
///
/// Blob writes are not transactional with the database; services compensate
/// by removing a freshly stored blob when the row write that references it
/// fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under a generated object name derived from `file_name`
    /// and return its public URL.
    async fn store(&self, bytes: &[u8], file_name: &str) -> Result<String, BlobStoreError>;

    /// Remove the blob behind a previously returned URL.
    async fn remove(&self, url: &str) -> Result<(), BlobStoreError>;
}

/// Fixture implementation for tests that do not exercise blob traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn store(&self, _bytes: &[u8], file_name: &str) -> Result<String, BlobStoreError> {
        Ok(format!("https://blobs.invalid/{file_name}"))
    }

    async fn remove(&self, _url: &str) -> Result<(), BlobStoreError> {
        Ok(())
    }
}
