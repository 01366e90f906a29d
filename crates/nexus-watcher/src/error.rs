//! Error types for the service layer.
//!
//! Per-file indexing failures never show up here; they're logged and
//! collected in a scan summary. These are the failures a caller of the
//! service or the watcher actually has to handle.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The worker has stopped and no longer accepts commands.
    #[error("index service has shut down")]
    Closed,

    #[error("failed to access config '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file system notification backend failed.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for ServiceError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for ServiceError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::Closed
    }
}
