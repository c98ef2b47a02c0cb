//! Blob storage adapters.

mod http_blob_store;

pub use http_blob_store::{BlobStoreConfig, HttpBlobStore};
