//! Error types for the analysis gateway.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface to a gateway caller.
///
/// Upstream model failures are deliberately absent: they are recovered inside each
/// operation and never reach the router.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body could not be decoded
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Registered path called with the wrong method
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    ///
    /// Malformed bodies are reported as 500, not 400: the gateway does not
    /// pre-validate request shape.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            _ => 500,
        }
    }
}
