//! Background dispatch for tracking requests.
//!
//! This crate decouples recording a tracking request from transmitting it:
//! callers submit encoded payloads and get back a serial number, a single
//! background worker drains the queue and performs the HTTP delivery, and a
//! status query reports whether a given submission was delivered.
//!
//! The crate provides:
//! - `Dispatcher`: the facade owning the queue, worker and delivery policy
//! - `DispatcherConfig` / `DispatchPolicy`: delivery tuning
//! - `RequestStatus`: per-serial delivery outcome query
//! - `Transport` / `HttpTransport`: the HTTP seam, swappable in tests

mod config;
mod dispatcher;
mod error;
mod queue;
mod sender;
mod transport;
mod worker;

#[cfg(test)]
mod tests;

pub use config::{DispatchPolicy, DispatcherConfig, DEFAULT_BATCH_LIMIT};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use queue::{PendingRequest, RequestStatus};
pub use transport::{HttpTransport, Transport, TransportError, WireRequest};
