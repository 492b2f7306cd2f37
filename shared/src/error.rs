//! Error types for the schedule app Lambda.

use thiserror::Error;
use validator::ValidationErrors;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a request.
#[derive(Error, Debug)]
pub enum Error {
    /// Key-value store failure (transport, throttling, permissions, service)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more request fields violated their schema
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Request body could not be interpreted
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::BadRequest(_) => 400,
            Error::Auth(_) => 401,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}
