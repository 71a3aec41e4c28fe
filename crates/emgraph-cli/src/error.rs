//! Application-wide error types using thiserror.

use emgraph_common::EmGraphError;
use emgraph_config::ConfigError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fetching, rendering or display failed.
    #[error(transparent)]
    Core(#[from] EmGraphError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;
