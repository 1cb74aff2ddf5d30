//! Error types for the location lookup functions.
//!
//! [`Error`] is the internal error carried through the crate. Callers of the
//! function only ever see a [`CallableError`], whose [`ErrorCode`] is one of a
//! closed set of categories.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a lookup.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The connect attempt against the document store failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query-time database error
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Missing or malformed caller input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Country code outside the supported set
    #[error("Unsupported country code: {0}")]
    UnsupportedCountry(String),

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
    /// Get the caller-facing category for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidArgument(_) | Error::UnsupportedCountry(_) => ErrorCode::InvalidArgument,
            Error::NotFound(_) => ErrorCode::NotFound,
            _ => ErrorCode::Internal,
        }
    }
}

/// Closed set of error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    Internal,
}

/// Error object returned to the caller of the function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableError {
    pub status: ErrorCode,
    pub message: String,
}

impl CallableError {
    pub fn new(status: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CallableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.status, self.message)
    }
}

impl std::error::Error for CallableError {}

/// Caller-facing errors keep their message. Everything else is logged here
/// with full detail and replaced by a generic message.
impl From<Error> for CallableError {
    fn from(err: Error) -> Self {
        let code = err.code();
        match err {
            Error::InvalidArgument(message) | Error::NotFound(message) => {
                CallableError::new(code, message)
            }
            Error::UnsupportedCountry(_) => CallableError::new(code, err.to_string()),
            Error::Config(_) => {
                error!(error = ?err, "Server configuration error");
                CallableError::new(code, "Server configuration error.")
            }
            Error::Connection(_) => {
                error!(error = ?err, "Failed to connect to the document store");
                CallableError::new(code, "Could not connect to the database.")
            }
            other => {
                error!(error = ?other, "Error fetching location details");
                CallableError::new(code, "An error occurred while fetching location details.")
            }
        }
    }
}
