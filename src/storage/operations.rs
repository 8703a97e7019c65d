//! Storage operations
//!
//! Filesystem side of the four file manager operations. Every function here
//! validates user-supplied names before touching the filesystem and reports
//! rejections as values rather than errors.

use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::Path;

use crate::protocol::UploadedFile;
use crate::storage::filesystem::{ManagedDirectory, directory_exists, entry_exists};
use crate::storage::results::{DeleteOutcome, Rejection, RenameOutcome, UploadReport};
use crate::storage::sort::sort_naturally;

/// Lists the visible regular files of the managed directory in natural order.
///
/// Dotfiles and directories are skipped. The directory is opened afresh on
/// every call.
pub fn list_files(directory: &ManagedDirectory) -> io::Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(directory.path())? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", directory.path().display(), e);
                continue;
            }
        };

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("Skipping non UTF-8 filename {:?}", raw);
                continue;
            }
        };

        if name.starts_with('.') || directory_exists(&entry.path()) {
            continue;
        }

        files.push(name);
    }

    sort_naturally(&mut files);

    debug!(
        "Listed {} files in {}",
        files.len(),
        directory.path().display()
    );

    Ok(files)
}

/// Renames `old_name` to `new_name` inside the managed directory.
///
/// Never overwrites an existing entry.
pub fn rename_file(directory: &ManagedDirectory, old_name: &str, new_name: &str) -> RenameOutcome {
    let (Some(old_path), Some(new_path)) = (directory.resolve(old_name), directory.resolve(new_name))
    else {
        warn!("Refusing rename {:?} -> {:?}: {}", old_name, new_name, Rejection::InvalidName);
        return RenameOutcome::Rejected(Rejection::InvalidName);
    };

    if !entry_exists(&old_path) {
        debug!("Refusing rename {:?}: {}", old_name, Rejection::NotFound);
        return RenameOutcome::Rejected(Rejection::NotFound);
    }

    if old_name == new_name {
        return RenameOutcome::Applied(new_name.to_string());
    }

    if entry_exists(&new_path) {
        debug!("Refusing rename {:?} -> {:?}: {}", old_name, new_name, Rejection::AlreadyExists);
        return RenameOutcome::Rejected(Rejection::AlreadyExists);
    }

    match fs::rename(&old_path, &new_path) {
        Ok(()) => {
            info!("Renamed {:?} -> {:?}", old_name, new_name);
            RenameOutcome::Applied(new_name.to_string())
        }
        Err(e) => {
            error!("Failed to rename {:?} -> {:?}: {}", old_name, new_name, e);
            RenameOutcome::Rejected(Rejection::IoFailure)
        }
    }
}

/// Deletes a regular file. Directories are never removed.
pub fn delete_file(directory: &ManagedDirectory, filename: &str) -> DeleteOutcome {
    let Some(path) = directory.resolve(filename) else {
        warn!("Refusing delete {:?}: {}", filename, Rejection::InvalidName);
        return DeleteOutcome::Rejected(Rejection::InvalidName);
    };

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(_) => {
            debug!("Refusing delete {:?}: {}", filename, Rejection::NotFound);
            return DeleteOutcome::Rejected(Rejection::NotFound);
        }
    };

    if metadata.is_dir() {
        warn!("Refusing delete {:?}: {}", filename, Rejection::IsDirectory);
        return DeleteOutcome::Rejected(Rejection::IsDirectory);
    }

    match fs::remove_file(&path) {
        Ok(()) => {
            info!("Deleted {:?}", filename);
            DeleteOutcome::Deleted
        }
        Err(e) => {
            error!("Failed to delete {:?}: {}", filename, e);
            DeleteOutcome::Rejected(Rejection::IoFailure)
        }
    }
}

/// Moves each successfully transferred, validly named upload into the
/// managed directory. Files are processed independently.
pub fn store_uploads(directory: &ManagedDirectory, files: &[UploadedFile]) -> UploadReport {
    let mut report = UploadReport::default();

    for file in files {
        if let Some(transfer_error) = &file.transfer_error {
            warn!("Upload {:?} failed in transfer: {}", file.name, transfer_error);
            report.files_with_errors.push(file.name.clone());
            continue;
        }

        let Some(destination) = directory.resolve(&file.name) else {
            warn!("Refusing upload {:?}: {}", file.name, Rejection::InvalidName);
            report.files_with_errors.push(file.name.clone());
            continue;
        };

        match move_file(&file.temp_path, &destination) {
            Ok(()) => {
                info!("Stored upload {:?}", file.name);
                report.uploaded_files.push(file.name.clone());
            }
            Err(e) => {
                error!("Failed to store upload {:?}: {}", file.name, e);
                report.files_with_errors.push(file.name.clone());
            }
        }
    }

    report
}

/// Renames `from` to `to`, falling back to copy and remove across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if directory_exists(to) {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            "destination is a directory",
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
