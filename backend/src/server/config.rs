//! HTTP server configuration object.

use std::net::SocketAddr;

use crate::outbound::blob::BlobStoreConfig;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) blob_store: BlobStoreConfig,
}

impl ServerConfig {
    /// Construct a server configuration from its parts.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, blob_store: BlobStoreConfig) -> Self {
        Self {
            bind_addr,
            db_pool,
            blob_store,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
