//! Error handlers
//!
//! Reporting helpers for fatal errors.

use crate::error::types::ServerError;
use log::error;
use std::error::Error;

/// Log a fatal server error
pub fn handle_error(err: &ServerError) {
    error!("Nanomanager error: {}", err);

    let mut source = err.source();
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
}

/// Process exit code for a fatal server error
pub fn error_to_exit_code(err: &ServerError) -> i32 {
    match err {
        ServerError::Config(_) => 78,
        ServerError::Manager(_) => 66,
        ServerError::Bind { .. } => 69,
        ServerError::Io(_) => 74,
    }
}
