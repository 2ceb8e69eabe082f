//! Core error types.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The collector URL could not be normalized
    #[error("Invalid collector URL: {0}")]
    InvalidUrl(String),

    /// An unsupported URL scheme was supplied
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
