//! Error types and utilities for emgraph

use thiserror::Error;

/// Result type alias for emgraph operations
pub type Result<T> = std::result::Result<T, EmGraphError>;

/// Main error type for emgraph operations
#[derive(Error, Debug)]
pub enum EmGraphError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network related errors (timeouts, refused connections, ...)
    #[error("Network error: {message}")]
    Network {
        /// Human readable description.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The device answered, but not with something usable
    #[error("Device API error: {message}")]
    Device {
        /// Human readable description.
        message: String,
        /// HTTP status returned by the device, if any.
        status_code: Option<u16>,
        /// Underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chart generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        /// Human readable description.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening the rendered chart in a viewer failed
    #[error("Display error: {message}")]
    Display {
        /// Human readable description.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for configuration values or input data
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable description.
        message: String,
        /// Offending field, if known.
        field: Option<String>,
    },
}

impl EmGraphError {
    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new device API error with HTTP status code
    pub fn device_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Device {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new display error with source
    pub fn display_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Display {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new display error
    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// HTTP status code attached to the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Device { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to EmGraphError
impl From<reqwest::Error> for EmGraphError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map_or(0, |s| s.as_u16());
            Self::Device {
                message: format!("HTTP error: {status_code}"),
                status_code: Some(status_code),
                source: Some(Box::new(err)),
            }
        } else if err.is_decode() {
            Self::Device {
                message: "Malformed response body".to_string(),
                status_code: None,
                source: Some(Box::new(err)),
            }
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to EmGraphError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for EmGraphError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
