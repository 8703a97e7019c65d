//! Operation dispatch
//!
//! Maps an operation type to its file manager operation and wraps the
//! outcome in the response envelope.

use log::{error, info, warn};

use crate::manager::FileManager;
use crate::protocol::commands::{OperationRequest, OperationType};
use crate::protocol::responses::{
    DeleteFileData, ListFilesData, OperationData, OperationResult, RenameFileData,
};

/// Dispatches a decoded request to its operation.
///
/// Parameters that are missing or not strings are passed on as empty strings,
/// which the filename validator rejects. An unknown operation type is the only
/// case answered with an error envelope.
pub fn dispatch(manager: &FileManager, request: &OperationRequest) -> OperationResult {
    let operation = match request.operation_type.parse::<OperationType>() {
        Ok(operation) => operation,
        Err(unsupported) => {
            warn!("{}", unsupported);
            return OperationResult::Error(unsupported.to_string());
        }
    };

    info!("Dispatching {}", operation);

    let data = match operation {
        OperationType::ListFiles => handle_op_list_files(manager),
        OperationType::RenameFile => handle_op_rename_file(manager, request),
        OperationType::DeleteFile => handle_op_delete_file(manager, request),
        OperationType::UploadFile => handle_op_upload_file(manager, request),
    };

    OperationResult::Data(data)
}

fn handle_op_list_files(manager: &FileManager) -> OperationData {
    let files = manager.list_files().unwrap_or_else(|e| {
        error!(
            "Managed directory {} became unreadable: {}",
            manager.directory().display(),
            e
        );
        Vec::new()
    });

    OperationData::ListFiles(ListFilesData {
        files,
        base_url: manager.base_url().to_string(),
    })
}

fn handle_op_rename_file(manager: &FileManager, request: &OperationRequest) -> OperationData {
    let old_name = request.string_parameter("oldName");
    let new_name = request.string_parameter("newName");

    let new_name = manager.rename_file(old_name, new_name).new_name_or(old_name);

    OperationData::RenameFile(RenameFileData { new_name })
}

fn handle_op_delete_file(manager: &FileManager, request: &OperationRequest) -> OperationData {
    let filename = request.string_parameter("filename");

    OperationData::DeleteFile(DeleteFileData {
        success: manager.delete_file(filename).is_success(),
    })
}

fn handle_op_upload_file(manager: &FileManager, request: &OperationRequest) -> OperationData {
    let report = manager.upload_files(&request.uploaded_files);

    info!(
        "Upload batch finished: {} stored, {} rejected",
        report.uploaded_files.len(),
        report.files_with_errors.len()
    );

    OperationData::UploadFile(report.into())
}
