//! The dispatcher facade.

use crate::config::{DispatchPolicy, DispatcherConfig};
use crate::error::{DispatchError, DispatchResult};
use crate::queue::{QueueState, RequestStatus};
use crate::sender::RequestSender;
use crate::transport::{HttpTransport, Transport};
use crate::worker;
use beacon_core::{normalize_api_url, Method};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// State shared between the dispatcher facade and its delivery worker.
pub(crate) struct DispatchShared {
    /// Queue, serials, watermark and failure set.
    pub(crate) state: Mutex<QueueState>,
    /// Runtime-mutable configuration.
    pub(crate) config: Mutex<DispatcherConfig>,
    /// Wake signal for the worker.
    pub(crate) wake: Notify,
    /// Cooperative stop flag, checked at every loop iteration and between
    /// dequeues.
    pub(crate) stop: AtomicBool,
}

/// Thread-safe submission facade over the queue and the delivery worker.
///
/// `submit` never blocks on the network: it appends to the queue, returns
/// the assigned serial, and lazily launches the worker on first use. The
/// only feedback channel for delivery outcomes is [`Dispatcher::request_status`].
///
/// Must live inside a tokio runtime; the worker is a spawned task.
pub struct Dispatcher {
    shared: Arc<DispatchShared>,
    /// Test seam: when set, the worker uses this transport instead of
    /// building an HTTP client.
    custom_transport: Option<Arc<dyn Transport>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            shared: Arc::new(DispatchShared {
                state: Mutex::new(QueueState::new()),
                config: Mutex::new(config),
                wake: Notify::new(),
                stop: AtomicBool::new(false),
            }),
            custom_transport: None,
            worker: Mutex::new(None),
        }
    }

    /// Build a dispatcher delivering through the given transport. Used by
    /// tests to substitute a recording fake for the HTTP client.
    pub fn with_transport(config: DispatcherConfig, transport: Arc<dyn Transport>) -> Self {
        let mut dispatcher = Self::new(config);
        dispatcher.custom_transport = Some(transport);
        dispatcher
    }

    // Configuration surface

    /// Set and normalize the collector URL. An `https://` scheme in the
    /// input also turns the secure flag on. No state changes on error.
    pub fn set_api_url(&self, url: &str) -> DispatchResult<()> {
        let api = normalize_api_url(url)?;
        let mut config = self.shared.config.lock().expect("lock poisoned");
        if api.secure {
            config.secure = true;
        }
        config.api = Some(api);
        Ok(())
    }

    /// The configured collector URL in `host/path` form.
    pub fn api_url(&self) -> Option<String> {
        let config = self.shared.config.lock().expect("lock poisoned");
        config.api.as_ref().map(|a| a.to_url())
    }

    pub fn set_method(&self, method: Method) {
        self.shared.config.lock().expect("lock poisoned").method = method;
    }

    pub fn method(&self) -> Method {
        self.shared.config.lock().expect("lock poisoned").method
    }

    pub fn set_secure(&self, secure: bool) {
        self.shared.config.lock().expect("lock poisoned").secure = secure;
    }

    pub fn is_secure(&self) -> bool {
        self.shared.config.lock().expect("lock poisoned").secure
    }

    pub fn set_dry_run(&self, dry_run: bool) {
        self.shared.config.lock().expect("lock poisoned").dry_run = dry_run;
    }

    pub fn is_dry_run(&self) -> bool {
        self.shared.config.lock().expect("lock poisoned").dry_run
    }

    pub fn set_connect_timeout(&self, timeout: Duration) {
        self.shared.config.lock().expect("lock poisoned").connect_timeout = timeout;
    }

    /// Set the dispatch policy from the second-based configuration surface:
    /// 0 = send on every submit, negative = manual flush only, positive =
    /// periodic.
    pub fn set_dispatch_interval(&self, secs: i64) {
        self.set_dispatch_policy(DispatchPolicy::from_secs(secs));
    }

    pub fn set_dispatch_policy(&self, policy: DispatchPolicy) {
        self.shared.config.lock().expect("lock poisoned").policy = policy;
        // A worker parked on the old policy's wait picks the new one up on
        // its next iteration.
        self.shared.wake.notify_one();
    }

    pub fn set_batch_limit(&self, limit: usize) {
        self.shared.config.lock().expect("lock poisoned").batch_limit = limit.max(1);
    }

    pub fn set_queue_limit(&self, limit: Option<usize>) {
        self.shared.config.lock().expect("lock poisoned").queue_limit = limit;
    }

    // Dispatching

    /// Queue an encoded tracking payload for delivery.
    ///
    /// Assigns the next serial (starting at 1, never reused), snapshots the
    /// collector address and method in effect, and wakes the worker when the
    /// policy is immediate. Never blocks on the network. Fails only when no
    /// collector URL is configured.
    pub fn submit(&self, payload: impl Into<String>) -> DispatchResult<u64> {
        let (host, path, method, queue_limit, wake_now) = {
            let config = self.shared.config.lock().expect("lock poisoned");
            let api = config.api.as_ref().ok_or(DispatchError::MissingApiUrl)?;
            (
                api.host.clone(),
                api.path.clone(),
                config.method,
                config.queue_limit,
                config.policy == DispatchPolicy::Immediate,
            )
        };

        let (serial, evicted) = {
            let mut state = self.shared.state.lock().expect("lock poisoned");
            state.enqueue(host, path, method, payload.into(), queue_limit)
        };
        if !evicted.is_empty() {
            warn!(
                dropped = evicted.len(),
                "queue limit reached, oldest pending requests marked failed"
            );
        }

        self.ensure_worker();
        if wake_now {
            self.shared.wake.notify_one();
        }

        Ok(serial)
    }

    /// Wake the worker out of its wait without blocking the caller. The
    /// wake permit is retained if the worker is mid-drain or not yet
    /// launched.
    pub fn flush(&self) {
        self.shared.wake.notify_one();
    }

    /// Delivery outcome for a previously submitted serial.
    pub fn request_status(&self, serial: u64) -> RequestStatus {
        self.shared.state.lock().expect("lock poisoned").status(serial)
    }

    /// Number of requests still waiting in the queue.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().expect("lock poisoned").pending_count()
    }

    /// Highest serial confirmed delivered.
    pub fn last_acknowledged(&self) -> u64 {
        self.shared
            .state
            .lock()
            .expect("lock poisoned")
            .last_acknowledged()
    }

    // Lifecycle

    /// Launch the worker if it is not running. A previous shutdown or a
    /// failed transport build is recovered here, on the next submit.
    fn ensure_worker(&self) {
        let mut guard = self.worker.lock().expect("lock poisoned");
        let running = guard.as_ref().map(|h| !h.is_finished()).unwrap_or(false);
        if running {
            return;
        }

        let transport: Arc<dyn Transport> = match &self.custom_transport {
            Some(t) => t.clone(),
            None => {
                let connect_timeout = {
                    let config = self.shared.config.lock().expect("lock poisoned");
                    config.connect_timeout
                };
                match HttpTransport::new(connect_timeout) {
                    Ok(t) => Arc::new(t),
                    Err(e) => {
                        // The submission stays queued; the next submit
                        // retries the launch.
                        error!(error = %e, "failed to build HTTP transport, delivery deferred");
                        return;
                    }
                }
            }
        };

        self.shared.stop.store(false, Ordering::Release);
        let shared = self.shared.clone();
        let sender = RequestSender::new(transport);
        *guard = Some(tokio::spawn(worker::run(shared, sender)));
    }

    /// Stop the worker, waiting up to the configured grace period for the
    /// in-flight batch. A worker that does not stop in time is aborted and
    /// logged; resources are released either way. Queued-but-unsent requests
    /// remain Pending and are picked up again if a later submit relaunches
    /// the worker.
    pub async fn shutdown(&self) {
        let handle = {
            let mut guard = self.worker.lock().expect("lock poisoned");
            guard.take()
        };
        let Some(handle) = handle else { return };

        self.shared.stop.store(true, Ordering::Release);
        self.shared.wake.notify_one();

        let grace = {
            let config = self.shared.config.lock().expect("lock poisoned");
            config.shutdown_grace
        };

        let abort = handle.abort_handle();
        match tokio::time::timeout(grace, handle).await {
            Ok(_) => {}
            Err(_) => {
                // Forced abandonment is the last resort, not the common
                // path; the stop flag above ends a healthy worker on its
                // own.
                warn!(
                    grace_secs = grace.as_secs(),
                    "delivery worker did not stop in time, aborting it"
                );
                abort.abort();
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Release the background task unconditionally, even when the owner
        // never called shutdown.
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.worker.lock().expect("lock poisoned").take() {
            handle.abort();
        }
    }
}
