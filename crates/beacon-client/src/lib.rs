//! High-level tracking facade for the beacon analytics client.
//!
//! Applications talk to [`Tracker`]: it holds the site and visitor
//! configuration, manages the visit session, turns semantic tracking calls
//! (screen views, events, goals, outlinks, content) into encoded collector
//! requests, and hands them to the background dispatcher for delivery.
//!
//! The crate provides:
//! - `Tracker`: the tracking facade over a `beacon_dispatch::Dispatcher`
//! - `EventSnapshot`: the per-event parameter set, for custom tracking calls
//! - `VisitStore` / `MemoryVisitStore` / `JsonVisitStore`: per-user visit
//!   counters for returning-visitor reporting

mod error;
mod snapshot;
mod tracker;
mod visit_store;

pub use beacon_core::{CustomVariables, Method};
pub use beacon_dispatch::RequestStatus;
pub use error::{TrackerError, TrackerResult};
pub use snapshot::EventSnapshot;
pub use tracker::{Tracker, DEFAULT_SESSION_TIMEOUT, DEFAULT_USER_AGENT};
pub use visit_store::{JsonVisitStore, MemoryVisitStore, VisitRecord, VisitStore};
