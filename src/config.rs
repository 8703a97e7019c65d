//! Configuration management for Nanomanager
//!
//! Loaded once at startup from an optional TOML file with environment
//! overrides (`NANOMANAGER_*`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::manager::FileManagerOptions;

/// Files searched for configuration, first match wins
const CONFIG_PATHS: [&str; 2] = ["nanomanager", "config/nanomanager"];

/// Complete server configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// IP address the HTTP listener binds to
    pub bind_address: String,

    /// Port of the HTTP listener
    pub port: u16,

    /// Directory whose files are managed
    pub managed_directory: String,

    /// Public URL prefix under which managed files are reachable
    pub base_url: String,

    /// URL the frontend posts its operations to; also the path the API is mounted at
    pub api_url: String,

    /// Create the managed directory on startup if it is missing
    pub create_missing_directory: bool,

    /// Maximum size of a single uploaded file in MB
    pub max_upload_size_mb: u64,

    /// Maximum number of files in one upload request; together with
    /// `max_upload_size_mb` this bounds the total request body
    pub max_files_per_upload: u64,
}

impl ServerConfig {
    /// Load configuration from `nanomanager.toml` with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_file = CONFIG_PATHS
            .iter()
            .find(|path| PathBuf::from(format!("{path}.toml")).exists())
            .copied();

        let mut builder = Self::defaults(Config::builder())?;

        if let Some(path) = config_file {
            log::info!("Loading configuration from {path}.toml");
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("NANOMANAGER").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit TOML file, without environment overrides
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults(Config::builder())?
            .add_source(File::with_name(path))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("managed_directory", "./uploads")?
            .set_default("base_url", "/files")?
            .set_default("api_url", "/")?
            .set_default("create_missing_directory", true)?
            .set_default("max_upload_size_mb", 64)?
            .set_default("max_files_per_upload", 20)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.managed_directory.is_empty() {
            return Err(config::ConfigError::Message(
                "managed_directory cannot be empty".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        if self.max_files_per_upload == 0 {
            return Err(config::ConfigError::Message(
                "max_files_per_upload must be greater than 0".into(),
            ));
        }

        if self.socket_addr().is_err() {
            return Err(config::ConfigError::Message(format!(
                "bind_address '{}' is not a valid IP address",
                self.bind_address
            )));
        }

        Ok(())
    }

    /// Bind address and port as a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.bind_address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Path the API and frontend are served at, derived from `api_url`
    pub fn api_path(&self) -> String {
        route_path(&self.api_url)
    }

    /// Path managed files are served under, derived from `base_url`
    pub fn files_path(&self) -> String {
        route_path(&self.base_url)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }

    /// Options for constructing the file manager
    pub fn file_manager_options(&self) -> FileManagerOptions {
        FileManagerOptions::new(&self.managed_directory)
            .base_url(self.base_url.trim_end_matches('/'))
            .api_url(&self.api_url)
            .create_missing_directory(self.create_missing_directory)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            managed_directory: "./uploads".to_string(),
            base_url: "/files".to_string(),
            api_url: "/".to_string(),
            create_missing_directory: true,
            max_upload_size_mb: 64,
            max_files_per_upload: 20,
        }
    }
}

/// Strips scheme and host from a URL, leaving a route path without trailing slash.
fn route_path(url: &str) -> String {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
        None => url,
    };

    let path = path.split(['?', '#']).next().unwrap_or("");
    let path = path.trim_end_matches('/');

    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
