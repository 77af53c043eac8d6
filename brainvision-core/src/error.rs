//! Error types shared by the header, marker and sample readers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a BrainVision recording.
///
/// Only structural problems surface here. Malformed lines inside an existing
/// file are skipped or defaulted by the parsers instead.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Truncated data file: expected {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReadError>;

/// Fails with [`ReadError::FileNotFound`] unless `path` exists.
pub(crate) fn require_file(path: &std::path::Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ReadError::FileNotFound(path.to_path_buf()))
    }
}
