//! Batch driver error types.

use std::path::PathBuf;

use crate::memory::MemoryError;
use crate::review::ReviewError;

/// Errors that can occur while running a batch.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not the expected JSON.
    #[error("Failed to parse {path}: {source}")]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An output file could not be written.
    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Learned memory could not be read or written.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// The reviewer could not be asked.
    #[error(transparent)]
    Review(#[from] ReviewError),
}
