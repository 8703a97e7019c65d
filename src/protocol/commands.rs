//! Module `commands`
//!
//! Data structures describing an operation request as received from the
//! frontend, after the transport has decoded it.

use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The four operations understood by the file manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    ListFiles,
    RenameFile,
    DeleteFile,
    UploadFile,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::ListFiles => "listFiles",
            OperationType::RenameFile => "renameFile",
            OperationType::DeleteFile => "deleteFile",
            OperationType::UploadFile => "uploadFile",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation type string that names none of the supported operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedOperation(pub String);

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported operation '{}'", self.0)
    }
}

impl std::error::Error for UnsupportedOperation {}

impl FromStr for OperationType {
    type Err = UnsupportedOperation;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "listFiles" => Ok(OperationType::ListFiles),
            "renameFile" => Ok(OperationType::RenameFile),
            "deleteFile" => Ok(OperationType::DeleteFile),
            "uploadFile" => Ok(OperationType::UploadFile),
            other => Err(UnsupportedOperation(other.to_string())),
        }
    }
}

/// Why the transport could not deliver an uploaded file intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The file exceeded the configured upload size limit.
    TooLarge,
    /// The body ended or failed before the file was fully received.
    Partial,
    /// The part carried no file at all.
    NoFile,
    /// The temporary file could not be written.
    CantWrite,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::TooLarge => write!(f, "file exceeds the upload size limit"),
            TransferError::Partial => write!(f, "file was only partially received"),
            TransferError::NoFile => write!(f, "no file was sent"),
            TransferError::CantWrite => write!(f, "temporary file could not be written"),
        }
    }
}

/// One uploaded file as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name declared by the client.
    pub name: String,
    /// Where the transport put the received bytes.
    pub temp_path: PathBuf,
    pub transfer_error: Option<TransferError>,
}

impl UploadedFile {
    pub fn received(name: impl Into<String>, temp_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            temp_path: temp_path.into(),
            transfer_error: None,
        }
    }

    pub fn failed(name: impl Into<String>, temp_path: impl Into<PathBuf>, error: TransferError) -> Self {
        Self {
            name: name.into(),
            temp_path: temp_path.into(),
            transfer_error: Some(error),
        }
    }
}

/// A decoded request, constructed fresh for every HTTP request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationRequest {
    /// Raw operation type as sent by the client.
    pub operation_type: String,
    pub parameters: Map<String, Value>,
    /// Only populated for `uploadFile`.
    pub uploaded_files: Vec<UploadedFile>,
}

impl OperationRequest {
    pub fn new(operation_type: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    pub fn with_uploaded_files(mut self, files: Vec<UploadedFile>) -> Self {
        self.uploaded_files = files;
        self
    }

    /// String parameter `key`, or the empty string when missing or not a string.
    pub fn string_parameter(&self, key: &str) -> &str {
        match self.parameters.get(key) {
            Some(Value::String(value)) => value,
            _ => "",
        }
    }
}
