//! Frontend protocol implementation
//!
//! Handles request decoding, operation dispatch and response envelopes.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{OperationRequest, OperationType, TransferError, UnsupportedOperation, UploadedFile};
pub use handlers::dispatch;
pub use parser::parse_json_request;
pub use responses::{OperationData, OperationResult};
