//! Submission queue, serial assignment and acknowledgment tracking.

use beacon_core::Method;
use std::collections::{HashSet, VecDeque};

/// A tracking request waiting for delivery.
///
/// Created on submit with a snapshot of the collector address and method in
/// effect at that moment; immutable afterwards. Owned by the queue until the
/// worker dequeues it for a send attempt.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Serial number assigned on submission, starting at 1, never reused.
    pub serial: u64,
    /// Collector host.
    pub host: String,
    /// Collector path.
    pub path: String,
    /// Delivery method for this request.
    pub method: Method,
    /// Encoded payload: a `?`-prefixed query string.
    pub payload: String,
}

/// Delivery outcome for a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Still queued or in flight; outcome unknown.
    Pending,
    /// Confirmed delivered (covered by the acknowledgment watermark).
    Succeeded,
    /// The delivery attempt for this request failed.
    Failed,
}

impl RequestStatus {
    /// Numeric form of the status: pending = 0, succeeded = 1, failed = -1.
    pub fn code(self) -> i8 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Succeeded => 1,
            RequestStatus::Failed => -1,
        }
    }
}

/// Queue bookkeeping shared between submitters and the delivery worker.
///
/// Lives behind the dispatcher's mutex; every method runs inside a short
/// critical section and none of them block.
#[derive(Debug)]
pub(crate) struct QueueState {
    pending: VecDeque<PendingRequest>,
    /// Serial handed out to the next submission.
    next_serial: u64,
    /// Highest serial confirmed delivered. Monotonically non-decreasing.
    last_acknowledged: u64,
    /// Serials whose delivery attempt failed. A serial can sit here even when
    /// a later batch advanced the watermark past it; Failed wins the status
    /// query because the queue never retries on its own.
    failed: HashSet<u64>,
}

impl QueueState {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            next_serial: 1,
            last_acknowledged: 0,
            failed: HashSet::new(),
        }
    }

    /// Append a request, assign its serial, and enforce the queue bound.
    ///
    /// Returns the assigned serial and the serials evicted to make room
    /// (oldest first), which the caller records as failed.
    pub(crate) fn enqueue(
        &mut self,
        host: String,
        path: String,
        method: Method,
        payload: String,
        limit: Option<usize>,
    ) -> (u64, Vec<u64>) {
        let serial = self.next_serial;
        self.next_serial += 1;

        self.pending.push_back(PendingRequest {
            serial,
            host,
            path,
            method,
            payload,
        });

        let mut evicted = Vec::new();
        if let Some(limit) = limit {
            while self.pending.len() > limit.max(1) {
                let dropped = self.pending.pop_front().expect("len checked above");
                self.failed.insert(dropped.serial);
                evicted.push(dropped.serial);
            }
        }

        (serial, evicted)
    }

    /// Dequeue the oldest pending request, if any.
    pub(crate) fn pop(&mut self) -> Option<PendingRequest> {
        self.pending.pop_front()
    }

    /// Advance the watermark after a verified-successful send. The watermark
    /// never moves backwards.
    pub(crate) fn acknowledge_up_to(&mut self, serial: u64) {
        if serial > self.last_acknowledged {
            self.last_acknowledged = serial;
        }
    }

    /// Record a failed delivery attempt for a set of serials.
    pub(crate) fn record_failed(&mut self, serials: impl IntoIterator<Item = u64>) {
        self.failed.extend(serials);
    }

    /// Delivery status for a serial. Failed takes priority over the
    /// watermark: an all-or-nothing batch failure is never masked by a later
    /// batch's success.
    pub(crate) fn status(&self, serial: u64) -> RequestStatus {
        if self.failed.contains(&serial) {
            RequestStatus::Failed
        } else if serial > 0 && serial <= self.last_acknowledged {
            RequestStatus::Succeeded
        } else {
            RequestStatus::Pending
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn last_acknowledged(&self) -> u64 {
        self.last_acknowledged
    }
}
