//! Nanomanager - Entry Point
//!
//! A small file manager serving a managed directory over HTTP.

use log::info;

use nanomanager::Server;
use nanomanager::config::ServerConfig;
use nanomanager::error::ServerError;
use nanomanager::error::handlers::{error_to_exit_code, handle_error};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching Nanomanager...");

    if let Err(e) = run().await {
        handle_error(&e);
        std::process::exit(error_to_exit_code(&e));
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    let server = Server::new(&config).await?;
    server.start().await
}
