//! Managed directory handling
//!
//! Resolves the managed directory once and hands out paths of its direct children.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::FileManagerError;
use crate::storage::validation::is_valid_filename;

/// Canonical absolute path of the directory a file manager is confined to.
///
/// Only the path is kept; the directory is re-opened for every listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDirectory {
    root: PathBuf,
}

impl ManagedDirectory {
    /// Resolve `path` to its canonical form and check it can be opened as a directory.
    ///
    /// With `create_missing` set, a missing directory is created (including parents) first.
    pub fn open(path: &Path, create_missing: bool) -> Result<Self, FileManagerError> {
        if create_missing && !path.exists() {
            fs::create_dir_all(path).map_err(|e| FileManagerError::unavailable(path, e))?;
            info!("Created managed directory {}", path.display());
        }

        let root = path
            .canonicalize()
            .map_err(|e| FileManagerError::unavailable(path, e))?;

        let metadata = fs::metadata(&root).map_err(|e| FileManagerError::unavailable(&root, e))?;
        if !metadata.is_dir() {
            return Err(FileManagerError::unavailable(
                &root,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        // Opening once up front surfaces permission problems at construction.
        fs::read_dir(&root).map_err(|e| FileManagerError::unavailable(&root, e))?;

        Ok(Self { root })
    }

    /// The canonical path of the managed directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns true if `name` is a valid direct child name of this directory.
    pub fn is_valid_filename(&self, name: &str) -> bool {
        is_valid_filename(&self.root, name)
    }

    /// Joins an already validated filename onto the managed directory.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Validates `name` and returns its path, or `None` if it is unsafe.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.is_valid_filename(name).then(|| self.entry_path(name))
    }
}

/// Check if a regular file (or a symlink to one) exists
pub fn file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}

/// Check if a directory (or a symlink to one) exists
pub fn directory_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Check if any entry exists at `path`, including dangling symlinks
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
