//! Error types for persistence operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the conversation record.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The pre-provisioned conversation record does not exist.
    #[error("conversation record '{key}' not found")]
    RecordMissing { key: String },

    /// The backing service rejected or failed the request.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The stored record does not have the expected shape.
    #[error("malformed conversation record: {0}")]
    Malformed(String),

    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to (de)serialize the record as JSON.
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Whether the error means the stored data itself is missing or broken,
    /// as opposed to the service being unreachable.
    pub fn is_inconsistency(&self) -> bool {
        matches!(
            self,
            PersistenceError::RecordMissing { .. }
                | PersistenceError::Malformed(_)
                | PersistenceError::Serialize(_)
        )
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
