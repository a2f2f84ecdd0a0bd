//! Error types for lead persistence.

use std::path::PathBuf;

use leadbot_models::LeadId;
use thiserror::Error;

/// Errors raised by a [`LeadStore`](crate::LeadStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No lead with this id exists (never created or already deleted).
    #[error("lead #{0} not found")]
    NotFound(LeadId),

    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lead data is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Whether this error means the record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
