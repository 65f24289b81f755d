//! Output traits and error types
//!
//! This module defines the trait interface for collection writers and the
//! errors output operations can raise.

use crate::model::ItemRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace {path}: {message}")]
    Persist { path: PathBuf, message: String },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Persists a finished collection
///
/// Called exactly once per run, after the page loop. A failure here is
/// fatal to the run.
pub trait CollectionWriter: Send + Sync {
    /// Writes the whole collection, replacing any previous artifact
    ///
    /// # Returns
    ///
    /// The path of the written artifact
    fn write(&self, collection: &[ItemRecord]) -> OutputResult<PathBuf>;
}
