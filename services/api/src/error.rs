//! services/api/src/error.rs
//!
//! Defines the primary error type for the catalog API service.

use crate::config::ConfigError;
use axum::http::StatusCode;
use library_catalog_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the core service or its store.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The error half of every handler's result.
pub type HandlerError = (StatusCode, String);

/// Maps a port error onto the status code and message returned to the client.
/// Storage failures are logged here, since their detail is not sent back.
pub fn port_error_response(op: &str, err: PortError) -> HandlerError {
    if let PortError::Unexpected(detail) = &err {
        error!("Failed to {}: {}", op, detail);
    }
    match err {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
        PortError::PreconditionFailed(reason) => (StatusCode::CONFLICT, reason),
        PortError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Catalog storage failed".to_string(),
        ),
    }
}
