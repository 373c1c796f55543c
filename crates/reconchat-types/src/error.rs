use std::path::PathBuf;

use thiserror::Error;

use crate::operation::Operation;

/// The single failure kind for backend exchanges.
///
/// Raised when the request cannot be completed, the status is not a
/// success, or the body cannot be decoded. No structured error payload
/// from the backend is ever parsed.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {detail}")]
pub struct TransportError {
    pub operation: Operation,
    /// HTTP status when the server answered at all.
    pub status: Option<u16>,
    pub detail: String,
}

impl TransportError {
    pub fn new(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            status: None,
            detail: detail.into(),
        }
    }

    pub fn with_status(operation: Operation, status: u16, detail: impl Into<String>) -> Self {
        Self {
            operation,
            status: Some(status),
            detail: detail.into(),
        }
    }
}

/// Errors persisting a downloaded artifact to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid artifact filename: '{0}'")]
    InvalidFilename(String),

    #[error("failed to prepare download directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}
