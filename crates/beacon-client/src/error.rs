use beacon_dispatch::DispatchError;
use thiserror::Error;

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker was disabled; configuration is kept but nothing is
    /// recorded.
    #[error("tracking is disabled")]
    Disabled,

    #[error("no site id is configured")]
    MissingSiteId,

    #[error("tracked path must not be empty")]
    EmptyPath,

    #[error("session timeout must be positive")]
    InvalidSessionTimeout,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
