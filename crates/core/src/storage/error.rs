//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the artifact store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Requested file type is not served.
    #[error("File type not allowed: {filename}")]
    DisallowedExtension { filename: String },

    /// Requested name is not a single plain file name.
    #[error("Invalid file name: {filename}")]
    InvalidFilename { filename: String },

    /// No such artifact (never produced, or already swept).
    #[error("File {filename} not found or has expired")]
    NotFound { filename: String },

    /// The converter reported success but its output could not be located.
    #[error("File conversion failed - file not found. Files in directory: {listing:?}")]
    ArtifactNotFound {
        expected: PathBuf,
        listing: Vec<String>,
    },

    /// Both rename and copy-then-delete failed.
    #[error("Failed to move file from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Filesystem error on the storage directory.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
