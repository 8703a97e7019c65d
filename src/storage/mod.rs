//! File system storage management
//!
//! Handles the managed directory, filename validation and the file operations.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod sort;
pub mod validation;

pub use filesystem::ManagedDirectory;
pub use results::{DeleteOutcome, Rejection, RenameOutcome, UploadReport};
pub use validation::is_valid_filename;
