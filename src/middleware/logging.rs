//! Logging middleware
//!
//! Logs every HTTP request with its outcome.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::time::Instant;

/// Log a request and the status it was answered with
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed = started.elapsed();

    if status.is_client_error() || status.is_server_error() {
        warn!("{} {} -> {} ({:?})", method, uri, status, elapsed);
    } else {
        info!("{} {} -> {} ({:?})", method, uri, status, elapsed);
    }

    response
}
