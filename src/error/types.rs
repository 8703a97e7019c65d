//! Error types
//!
//! Defines the fatal error types of the file manager. Per-operation
//! rejections are not errors; see `storage::results`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Construction-time errors of a `FileManager`
#[derive(Debug, Error)]
pub enum FileManagerError {
    /// The managed directory is missing, not a directory, or cannot be opened.
    #[error("Unable to open directory {path:?}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileManagerError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FileManagerError::DirectoryUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop the standalone server from starting
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("File manager error: {0}")]
    Manager(#[from] FileManagerError),

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
