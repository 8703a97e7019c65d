pub mod config;
pub mod error;
pub mod manager;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod storage;

pub use manager::{FileManager, FileManagerOptions};
pub use server::Server;
