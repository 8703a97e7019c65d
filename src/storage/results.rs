//! Storage result types
//!
//! Tagged outcomes of the mutating operations. Callers at the HTTP boundary
//! only ever see the collapsed shapes (`new_name_or`, `is_success`).

use std::fmt;

/// Why an operation left the filesystem untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidName,
    NotFound,
    AlreadyExists,
    IsDirectory,
    IoFailure,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidName => write!(f, "invalid filename"),
            Rejection::NotFound => write!(f, "no such file"),
            Rejection::AlreadyExists => write!(f, "target already exists"),
            Rejection::IsDirectory => write!(f, "entry is a directory"),
            Rejection::IoFailure => write!(f, "filesystem operation failed"),
        }
    }
}

/// Result of a rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Applied(String),
    Rejected(Rejection),
}

impl RenameOutcome {
    /// The name the file has after the call: the new name, or `old_name` if rejected.
    pub fn new_name_or(self, old_name: &str) -> String {
        match self {
            RenameOutcome::Applied(new_name) => new_name,
            RenameOutcome::Rejected(_) => old_name.to_string(),
        }
    }
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Rejected(Rejection),
}

impl DeleteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// Per-file bookkeeping of an upload batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded_files: Vec<String>,
    pub files_with_errors: Vec<String>,
}
