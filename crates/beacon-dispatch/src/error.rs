//! Dispatch error types.

use thiserror::Error;

/// Dispatch error type.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Collector URL rejected by normalization
    #[error(transparent)]
    Config(#[from] beacon_core::CoreError),

    /// No collector URL has been configured yet
    #[error("No collector URL configured")]
    MissingApiUrl,
}

/// Result type alias using DispatchError.
pub type DispatchResult<T> = Result<T, DispatchError>;
