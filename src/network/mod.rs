//! Network module - Stream plumbing shared by the render and hit clients
//!
//! Provides:
//! - Connection wrapper that writes one message per write call
//! - Unix stream socket connect helper
//! - The error type returned by channel client operations

mod connection;

pub use connection::*;

use std::path::Path;
use thiserror::Error;

use crate::config::ConfigError;
use crate::protocol::PathError;

/// Errors returned by render and hit client operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Connection(ConnectionError::Io(err))
    }
}

/// Open a stream connection to a local service socket
#[cfg(unix)]
pub async fn connect_unix(path: &Path) -> std::io::Result<tokio::net::UnixStream> {
    tracing::info!("Connecting to {}", path.display());

    match tokio::net::UnixStream::connect(path).await {
        Ok(stream) => Ok(stream),
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", path.display(), e);
            Err(e)
        }
    }
}
