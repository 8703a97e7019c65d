//! Module `manager`
//!
//! The `FileManager`: a managed directory plus the public URLs the frontend
//! needs, exposing the list, rename, delete and upload operations.

use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::FileManagerError;
use crate::protocol::{OperationRequest, OperationResult, UploadedFile, dispatch};
use crate::storage::operations;
use crate::storage::{DeleteOutcome, ManagedDirectory, RenameOutcome, UploadReport};

/// Construction parameters of a `FileManager`.
#[derive(Debug, Clone)]
pub struct FileManagerOptions {
    pub directory: PathBuf,
    /// Prefix used by the frontend to link to files.
    pub base_url: String,
    /// URL the frontend sends its operations to.
    pub api_url: String,
    pub create_missing_directory: bool,
}

impl FileManagerOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            base_url: String::new(),
            api_url: String::new(),
            create_missing_directory: false,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn create_missing_directory(mut self, create: bool) -> Self {
        self.create_missing_directory = create;
        self
    }
}

/// File manager confined to a single directory.
#[derive(Debug)]
pub struct FileManager {
    directory: ManagedDirectory,
    base_url: String,
    api_url: String,
}

impl FileManager {
    /// Opens the managed directory. Fails if it is missing or cannot be opened.
    pub fn new(options: FileManagerOptions) -> Result<Self, FileManagerError> {
        let directory =
            ManagedDirectory::open(&options.directory, options.create_missing_directory)?;

        info!("Managing directory {}", directory.path().display());

        Ok(Self {
            directory,
            base_url: options.base_url,
            api_url: options.api_url,
        })
    }

    /// Canonical path of the managed directory.
    pub fn directory(&self) -> &Path {
        self.directory.path()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn is_valid_filename(&self, name: &str) -> bool {
        self.directory.is_valid_filename(name)
    }

    /// Path of a managed file, if `name` is valid and names an existing non-directory.
    pub fn file_path(&self, name: &str) -> Option<PathBuf> {
        self.directory
            .resolve(name)
            .filter(|path| crate::storage::filesystem::file_exists(path))
    }

    pub fn list_files(&self) -> io::Result<Vec<String>> {
        operations::list_files(&self.directory)
    }

    pub fn rename_file(&self, old_name: &str, new_name: &str) -> RenameOutcome {
        operations::rename_file(&self.directory, old_name, new_name)
    }

    pub fn delete_file(&self, filename: &str) -> DeleteOutcome {
        operations::delete_file(&self.directory, filename)
    }

    pub fn upload_files(&self, files: &[UploadedFile]) -> UploadReport {
        operations::store_uploads(&self.directory, files)
    }

    /// Runs the operation named by `request`.
    pub fn dispatch(&self, request: &OperationRequest) -> OperationResult {
        dispatch(self, request)
    }
}
