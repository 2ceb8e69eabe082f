//! Integration tests for the dispatcher.
//!
//! Organization:
//!
//! - `harness.rs`   - RecordingTransport fake and dispatcher builders
//! - `serials.rs`   - serial assignment, including concurrent submitters
//! - `status.rs`    - watermark, failure set and status query semantics
//! - `batching.rs`  - POST envelopes, GET singles, batch limits
//! - `lifecycle.rs` - lazy launch, flush, shutdown, relaunch, queue bound

mod batching;
mod serials;
mod status;
