//! Runtime error types.

use tsgate_engine::StdLibError;
use tsgate_net::FetchError;

use crate::config::ConfigError;

/// Errors that can occur while starting the service.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Standard library could not be downloaded
    #[error("{0}")]
    StdLib(#[from] StdLibError),

    /// HTTP client could not be created
    #[error("Fetcher error: {0}")]
    Fetch(#[from] FetchError),

    /// A global log subscriber is already installed
    #[error("Logging error: {0}")]
    Logging(String),
}
