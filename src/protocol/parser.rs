//! Request decoding
//!
//! Turns a JSON request body into an `OperationRequest`. Malformed input
//! never fails: missing or mistyped fields degrade to empty values.

use log::debug;
use serde_json::{Map, Value};

use crate::protocol::commands::OperationRequest;

/// Multipart field carrying the operation type.
pub const OPERATION_TYPE_FIELD: &str = "operationType";
/// Multipart field carrying uploaded files.
pub const FILES_FIELD: &str = "files[]";

/// Decodes `{"operationType": ..., "parameters": {...}}`.
pub fn parse_json_request(body: &[u8]) -> OperationRequest {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            debug!("Undecodable JSON request body: {}", e);
            Value::Null
        }
    };

    request_from_value(value)
}

/// Builds a request from an already decoded JSON value.
pub fn request_from_value(value: Value) -> OperationRequest {
    let Value::Object(mut body) = value else {
        return OperationRequest::default();
    };

    let operation_type = match body.remove(OPERATION_TYPE_FIELD) {
        Some(Value::String(operation_type)) => operation_type,
        _ => String::new(),
    };

    let parameters = match body.remove("parameters") {
        Some(Value::Object(parameters)) => parameters,
        _ => Map::new(),
    };

    OperationRequest {
        operation_type,
        parameters,
        uploaded_files: Vec::new(),
    }
}
