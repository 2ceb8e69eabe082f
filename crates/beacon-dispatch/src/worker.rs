//! The delivery worker: a single background task draining the queue.

use crate::config::DispatchPolicy;
use crate::dispatcher::DispatchShared;
use crate::queue::PendingRequest;
use crate::sender::{RequestSender, SendTarget};
use beacon_core::Method;
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The batched POST wire format: each element is itself a `?`-prefixed
/// encoded query string. The nesting is the collector's bulk-tracking
/// contract, not a formatting shortcut.
#[derive(Serialize)]
struct PostEnvelope<'a> {
    requests: Vec<&'a str>,
}

/// Worker loop. Waits for a wake (explicit flush, immediate-mode submit, or
/// timer expiry depending on policy), drains the queue, and goes back to
/// sleep. Exits when the stop flag is raised; the drain in progress finishes
/// its current batch first.
pub(crate) async fn run(shared: Arc<DispatchShared>, sender: RequestSender) {
    info!("delivery worker started");

    loop {
        let policy = {
            let config = shared.config.lock().expect("lock poisoned");
            config.policy
        };

        match policy {
            // Submits and flushes store a wake permit, so nothing is lost if
            // it arrived while a previous pass was still draining.
            DispatchPolicy::Immediate | DispatchPolicy::Manual => shared.wake.notified().await,
            DispatchPolicy::Every(interval) => {
                let _ = tokio::time::timeout(interval, shared.wake.notified()).await;
            }
        }

        if shared.stop.load(Ordering::Acquire) {
            break;
        }

        drain(&shared, &sender).await;

        if shared.stop.load(Ordering::Acquire) {
            break;
        }
    }

    info!("delivery worker stopped");
}

/// One drain pass: dequeue requests one at a time, sending GET-bound items
/// individually and bundling POST-bound items into envelopes of at most the
/// configured batch limit.
///
/// A batch is acknowledged all-or-nothing: the collector returns a single
/// status for the whole envelope, so success advances the watermark to the
/// batch's highest serial and failure marks every serial in it failed.
async fn drain(shared: &Arc<DispatchShared>, sender: &RequestSender) {
    // Snapshot the fields a pass depends on; setter calls made while this
    // pass is sending apply from the next pass on.
    let (secure, dry_run, batch_limit) = {
        let config = shared.config.lock().expect("lock poisoned");
        (config.secure, config.dry_run, config.batch_limit.max(1))
    };

    let mut batch: Vec<PendingRequest> = Vec::new();

    loop {
        if shared.stop.load(Ordering::Acquire) {
            break;
        }

        let (item, remaining) = {
            let mut state = shared.state.lock().expect("lock poisoned");
            let item = state.pop();
            let remaining = state.pending_count();
            (item, remaining)
        };

        let Some(item) = item else { break };

        match item.method {
            Method::Get => {
                let target = SendTarget {
                    host: item.host.clone(),
                    path: item.path.clone(),
                    secure,
                    dry_run,
                };
                let delivered = sender.send(&target, Method::Get, &item.payload).await;
                record_outcome(shared, std::slice::from_ref(&item), delivered);
            }
            Method::Post => {
                batch.push(item);
                if batch.len() >= batch_limit || remaining == 0 {
                    flush_batch(shared, sender, &mut batch, secure, dry_run).await;
                }
            }
        }
    }

    // Stop can interrupt the dequeue loop with a partial batch accumulated;
    // it still goes out as the in-flight batch before the worker exits.
    if !batch.is_empty() {
        flush_batch(shared, sender, &mut batch, secure, dry_run).await;
    }
}

async fn flush_batch(
    shared: &Arc<DispatchShared>,
    sender: &RequestSender,
    batch: &mut Vec<PendingRequest>,
    secure: bool,
    dry_run: bool,
) {
    let envelope = PostEnvelope {
        requests: batch.iter().map(|r| r.payload.as_str()).collect(),
    };
    let body = serde_json::to_string(&envelope).expect("envelope serialization is infallible");

    let target = SendTarget {
        host: batch[0].host.clone(),
        path: batch[0].path.clone(),
        secure,
        dry_run,
    };

    let delivered = sender.send(&target, Method::Post, &body).await;
    record_outcome(shared, batch, delivered);
    batch.clear();
}

fn record_outcome(shared: &Arc<DispatchShared>, batch: &[PendingRequest], delivered: bool) {
    let mut state = shared.state.lock().expect("lock poisoned");
    if delivered {
        let max_serial = batch.iter().map(|r| r.serial).max().unwrap_or(0);
        state.acknowledge_up_to(max_serial);
        debug!(
            requests = batch.len(),
            watermark = max_serial,
            "delivery confirmed"
        );
    } else {
        state.record_failed(batch.iter().map(|r| r.serial));
        warn!(requests = batch.len(), "delivery failed, serials recorded");
    }
}
