//! Backend entry-point: wires configuration, the database pool, the blob
//! store and the HTTP server.

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lighthouse_backend::outbound::blob::BlobStoreConfig;
use lighthouse_backend::outbound::persistence::{DbPool, PoolConfig};
use lighthouse_backend::server::{ServerConfig, create_server};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

fn require_env(name: &str) -> std::io::Result<String> {
    env::var(name).map_err(|_| std::io::Error::other(format!("{name} must be set")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = require_env("DATABASE_URL")?;
    let blob_store_url = require_env("BLOB_STORE_URL")?;

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
        .parse()
        .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?;

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;

    let mut blob_config = BlobStoreConfig::new(blob_store_url);
    if let Ok(token) = env::var("BLOB_STORE_TOKEN") {
        blob_config = blob_config.with_token(token);
    }

    let server = create_server(ServerConfig::new(bind_addr, pool, blob_config))?;
    info!(%bind_addr, "server listening");
    server.await
}
