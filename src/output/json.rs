//! JSON collection writer
//!
//! The collection is written as a pretty-printed JSON array (two-space
//! indent, UTF-8 kept as-is, trailing newline) so that consecutive runs
//! diff cleanly. The file is first written next to the destination and then
//! renamed over it, so readers never observe a half-written artifact.

use crate::model::{Collection, ItemRecord};
use crate::output::traits::{CollectionWriter, OutputError, OutputResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes the collection to a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    /// Creates a writer targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The destination path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CollectionWriter for JsonFileWriter {
    fn write(&self, collection: &[ItemRecord]) -> OutputResult<PathBuf> {
        let json = format_collection(collection)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|source| OutputError::Io {
            path: dir.clone(),
            source,
        })?;

        let io_err = |source| OutputError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&dir).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        file.persist(&self.path).map_err(|e| OutputError::Persist {
            path: self.path.clone(),
            message: e.error.to_string(),
        })?;

        tracing::debug!("Wrote {} bytes to {}", json.len(), self.path.display());
        Ok(self.path.clone())
    }
}

/// Formats the collection exactly as it is written to disk
pub fn format_collection(collection: &[ItemRecord]) -> OutputResult<String> {
    let mut json = serde_json::to_string_pretty(collection)?;
    json.push('\n');
    Ok(json)
}

/// Reads a previously written collection
pub fn read_collection(path: &Path) -> OutputResult<Collection> {
    let content = std::fs::read_to_string(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
