//! Response envelopes
//!
//! Every operation answers with `{"data": {...}}`; only an unsupported
//! operation type answers with `{"error": "..."}` and a 400 status.

use serde::Serialize;

use crate::storage::UploadReport;

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesData {
    pub files: Vec<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileData {
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFileData {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileData {
    pub uploaded_files: Vec<String>,
    pub files_with_errors: Vec<String>,
}

impl From<UploadReport> for UploadFileData {
    fn from(report: UploadReport) -> Self {
        Self {
            uploaded_files: report.uploaded_files,
            files_with_errors: report.files_with_errors,
        }
    }
}

/// Payload of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationData {
    ListFiles(ListFilesData),
    RenameFile(RenameFileData),
    DeleteFile(DeleteFileData),
    UploadFile(UploadFileData),
}

/// The JSON envelope returned to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationResult {
    Data(OperationData),
    Error(String),
}

impl OperationResult {
    /// HTTP status code to send along with this result.
    pub fn status(&self) -> u16 {
        match self {
            OperationResult::Data(_) => OK,
            OperationResult::Error(_) => BAD_REQUEST,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationResult::Error(_))
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
