use axum::Router;
use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::manager::FileManager;
use crate::middleware::log_request;
use crate::protocol::parser::{FILES_FIELD, OPERATION_TYPE_FIELD};
use crate::protocol::responses::JSON_CONTENT_TYPE;
use crate::protocol::{
    OperationRequest, OperationResult, TransferError, UploadedFile, parse_json_request,
};
use crate::server::frontend::render_frontend;

/// Limit for JSON operation bodies.
const MAX_JSON_BODY_SIZE: usize = 1024 * 1024;

/// Allowance for multipart boundaries and part headers.
const MULTIPART_PART_OVERHEAD: u64 = 1024;

/// Prefix of temporary upload files. The leading dot keeps them out of listings.
const UPLOAD_TEMP_PREFIX: &str = ".upload-";

/// Size limits applied to upload requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum size of a single uploaded file in bytes
    pub max_file_size: u64,
    /// Maximum number of files in one request
    pub max_files: u64,
}

impl UploadLimits {
    /// Total request body budget: every file at its maximum size plus part overhead.
    pub fn max_body_size(&self) -> usize {
        let per_file = self.max_file_size.saturating_add(MULTIPART_PART_OVERHEAD);
        let total = self
            .max_files
            .saturating_mul(per_file)
            .saturating_add(MULTIPART_PART_OVERHEAD);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}

/// The request body exceeded `UploadLimits::max_body_size`.
#[derive(Debug)]
struct BodyTooLarge;

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    manager: Arc<FileManager>,
    frontend: Arc<str>,
    limits: UploadLimits,
}

impl AppState {
    pub fn new(manager: FileManager, limits: UploadLimits) -> Self {
        let frontend = render_frontend(manager.api_url());
        Self {
            manager: Arc::new(manager),
            frontend: frontend.into(),
            limits,
        }
    }

    pub fn manager(&self) -> &FileManager {
        &self.manager
    }
}

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Opens the managed directory and binds the HTTP listener.
    pub async fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        let manager = FileManager::new(config.file_manager_options())?;

        let addr = config.socket_addr().map_err(|e| ServerError::Bind {
            addr: config.bind_address.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        info!("Server bound to {}", addr);

        let limits = UploadLimits {
            max_file_size: config.max_upload_size_bytes(),
            max_files: config.max_files_per_upload,
        };
        let state = AppState::new(manager, limits);
        let router = build_router(&config.api_path(), &config.files_path(), state);

        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C is received.
    pub async fn start(self) -> Result<(), ServerError> {
        info!("Starting Nanomanager on {}", self.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Builds the router: the frontend and operations at `api_path`, managed
/// files below `files_path`.
pub fn build_router(api_path: &str, files_path: &str, state: AppState) -> Router {
    let file_route = format!("{}/{{name}}", files_path.trim_end_matches('/'));
    let body_limit = state.limits.max_body_size();

    Router::new()
        .route(api_path, get(serve_frontend).post(handle_operation))
        .route(&file_route, get(serve_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn serve_frontend(State(state): State<AppState>) -> Html<String> {
    Html(state.frontend.to_string())
}

async fn serve_file(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(path) = state.manager.file_path(&name) else {
        debug!("No servable file {:?}", name);
        return StatusCode::NOT_FOUND.into_response();
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open {}: {}", path.display(), e);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let length = file.metadata().await.map(|metadata| metadata.len());

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(length) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    response
}

/// Decodes a JSON or multipart operation request and dispatches it.
async fn handle_operation(State(state): State<AppState>, request: Request) -> Response {
    let body_limit = state.limits.max_body_size();
    if declared_length(&request).is_some_and(|length| length > body_limit as u64) {
        warn!("Refusing request body larger than {} bytes", body_limit);
        return body_too_large_response(body_limit);
    }

    let (operation, temp_files) = if is_multipart(&request) {
        match Multipart::from_request(request, &state).await {
            Ok(multipart) => match read_multipart(multipart, &state).await {
                Ok(decoded) => decoded,
                Err(BodyTooLarge) => {
                    warn!("Upload body exceeded {} bytes", body_limit);
                    return body_too_large_response(body_limit);
                }
            },
            Err(rejection) => {
                warn!("Rejected multipart request: {}", rejection);
                (OperationRequest::default(), Vec::new())
            }
        }
    } else {
        match axum::body::to_bytes(request.into_body(), MAX_JSON_BODY_SIZE).await {
            Ok(body) => (parse_json_request(&body), Vec::new()),
            Err(e) => {
                warn!("Failed to read request body: {}", e);
                (OperationRequest::default(), Vec::new())
            }
        }
    };

    let manager = Arc::clone(&state.manager);
    let dispatched = tokio::task::spawn_blocking(move || {
        let result = manager.dispatch(&operation);
        // Removes whatever was not moved into the managed directory.
        drop(temp_files);
        result
    })
    .await;

    match dispatched {
        Ok(result) => operation_response(&result),
        Err(e) => {
            error!("Operation task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn is_multipart(request: &Request) -> bool {
    const MULTIPART_FORM_DATA: &str = "multipart/form-data";

    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.get(..MULTIPART_FORM_DATA.len()))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MULTIPART_FORM_DATA))
}

fn declared_length(request: &Request) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

fn operation_response(result: &OperationResult) -> Response {
    let status = StatusCode::from_u16(result.status()).unwrap_or(StatusCode::BAD_REQUEST);

    match result.to_json() {
        Ok(body) => json_response(status, body),
        Err(e) => {
            error!("Failed to serialize operation result: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn body_too_large_response(limit: usize) -> Response {
    let body = serde_json::json!({
        "error": format!("Request body exceeds {limit} bytes"),
    });
    json_response(StatusCode::PAYLOAD_TOO_LARGE, body.to_string().into_bytes())
}

fn exceeds_body_limit(error: &MultipartError) -> bool {
    error.status() == StatusCode::PAYLOAD_TOO_LARGE
}

/// Reads `operationType` and every `files[]` part. Returns the guards of
/// the temporary files alongside the request; they are dropped (and the
/// files removed) if the body turns out to be over the limit.
async fn read_multipart(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<(OperationRequest, Vec<TempPath>), BodyTooLarge> {
    let mut request = OperationRequest::default();
    let mut temp_files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if exceeds_body_limit(&e) => return Err(BodyTooLarge),
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                break;
            }
        };

        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(OPERATION_TYPE_FIELD) => {
                request.operation_type = field.text().await.unwrap_or_default();
            }
            Some(FILES_FIELD) => {
                let (file, temp_file) = receive_file(field, state).await?;
                request.uploaded_files.push(file);
                temp_files.extend(temp_file);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok((request, temp_files))
}

/// Streams one uploaded file into a hidden temporary file inside the managed directory.
async fn receive_file(
    mut field: Field<'_>,
    state: &AppState,
) -> Result<(UploadedFile, Option<TempPath>), BodyTooLarge> {
    let name = field.file_name().unwrap_or_default().to_string();
    let max_file_size = state.limits.max_file_size;

    let temp_file = match tempfile::Builder::new()
        .prefix(UPLOAD_TEMP_PREFIX)
        .tempfile_in(state.manager.directory())
    {
        Ok(temp_file) => temp_file,
        Err(e) => {
            error!("Failed to create temporary file for {:?}: {}", name, e);
            return Ok((
                UploadedFile::failed(name, PathBuf::new(), TransferError::CantWrite),
                None,
            ));
        }
    };

    let (file, temp_path) = temp_file.into_parts();
    let mut file = tokio::fs::File::from_std(file);
    let mut received: u64 = 0;
    let mut transfer_error = None;

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                received += chunk.len() as u64;
                if received > max_file_size {
                    warn!("Upload {:?} exceeds limit of {} bytes", name, max_file_size);
                    transfer_error = Some(TransferError::TooLarge);
                    break;
                }
                if let Err(e) = file.write_all(&chunk).await {
                    error!("Failed to write upload {:?}: {}", name, e);
                    transfer_error = Some(TransferError::CantWrite);
                    break;
                }
            }
            Ok(None) => break,
            Err(e) if exceeds_body_limit(&e) => return Err(BodyTooLarge),
            Err(e) => {
                warn!("Upload {:?} interrupted: {}", name, e);
                transfer_error = Some(TransferError::Partial);
                break;
            }
        }
    }

    if transfer_error.is_none() {
        if let Err(e) = file.flush().await {
            error!("Failed to flush upload {:?}: {}", name, e);
            transfer_error = Some(TransferError::CantWrite);
        }
    }

    if transfer_error.is_none() && name.is_empty() && received == 0 {
        transfer_error = Some(TransferError::NoFile);
    }

    debug!("Received {} bytes for upload {:?}", received, name);

    let file = UploadedFile {
        name,
        temp_path: temp_path.to_path_buf(),
        transfer_error,
    };

    Ok((file, Some(temp_path)))
}
