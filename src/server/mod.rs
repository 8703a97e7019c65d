//! Server core functionality
//!
//! The HTTP adapter of the standalone binary: decodes requests, hands them
//! to the file manager and renders the responses and the bundled frontend.

pub mod core;
pub mod frontend;

pub use self::core::{AppState, Server, UploadLimits, build_router};
pub use frontend::render_frontend;
