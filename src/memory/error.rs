//! Memory store error types.

use std::path::PathBuf;

/// Errors that can occur during memory store operations.
#[derive(thiserror::Error, Debug)]
pub enum MemoryError {
    /// Failed to open or create database.
    #[error("Failed to open memory database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to execute SQL.
    #[error("Memory query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Failed to serialize corrections.
    #[error("Failed to serialize corrections: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A stored row could not be decoded.
    #[error("Corrupt review for invoice {invoice_id}: {reason}")]
    Corrupt { invoice_id: String, reason: String },

    /// Blocking task was cancelled.
    #[error("Blocking task cancelled")]
    TaskCancelled,

    /// Failed to create parent directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
