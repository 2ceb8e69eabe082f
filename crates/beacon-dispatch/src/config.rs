//! Dispatcher configuration.

use beacon_core::{ApiUrl, Method};
use std::time::Duration;

/// Default maximum number of requests bundled into one POST body.
pub const DEFAULT_BATCH_LIMIT: usize = 20;

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time between delivery passes.
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Default grace period granted to the worker on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// When the delivery worker wakes up on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Wake on every submission (interval 0 in the configuration surface).
    Immediate,
    /// Wake only on an explicit flush (negative interval).
    Manual,
    /// Wake every interval, or earlier on an explicit flush.
    Every(Duration),
}

impl DispatchPolicy {
    /// Map the second-based configuration surface onto a policy:
    /// zero is immediate, negative is manual, positive is periodic.
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => DispatchPolicy::Immediate,
            s if s < 0 => DispatchPolicy::Manual,
            s => DispatchPolicy::Every(Duration::from_secs(s as u64)),
        }
    }
}

/// Configuration for the dispatcher and its delivery worker.
///
/// Mutable at runtime through the [`Dispatcher`](crate::Dispatcher) setters;
/// the worker snapshots the fields it needs at the start of every drain pass,
/// so a concurrent change applies from the next pass on.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Normalized collector address; `None` until configured.
    pub api: Option<ApiUrl>,
    /// HTTP method preference for tracking requests.
    pub method: Method,
    /// Use https when true.
    pub secure: bool,
    /// Log the would-be request instead of performing network I/O.
    pub dry_run: bool,
    /// Connection timeout for the HTTP client.
    pub connect_timeout: Duration,
    /// When the worker wakes up without an explicit flush.
    pub policy: DispatchPolicy,
    /// Maximum number of POST-bound requests per body.
    pub batch_limit: usize,
    /// How long shutdown waits for the in-flight batch before abandoning it.
    pub shutdown_grace: Duration,
    /// Optional bound on the pending queue. When full, the oldest pending
    /// request is evicted and recorded as failed.
    pub queue_limit: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            api: None,
            method: Method::default(),
            secure: false,
            dry_run: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            policy: DispatchPolicy::Every(DEFAULT_DISPATCH_INTERVAL),
            batch_limit: DEFAULT_BATCH_LIMIT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            queue_limit: None,
        }
    }
}
