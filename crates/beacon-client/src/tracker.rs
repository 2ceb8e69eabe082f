//! The tracking facade.

use crate::error::{TrackerError, TrackerResult};
use crate::snapshot::EventSnapshot;
use crate::visit_store::{JsonVisitStore, MemoryVisitStore, VisitStore};
use beacon_core::{visitor_id_for_user, CustomVariables, Method, QueryFormat};
use beacon_dispatch::{Dispatcher, DispatcherConfig, RequestStatus};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// A session that sees no tracking call for this long is over; the next
/// call starts a new visit.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// User agent reported to the collector when the application sets none.
pub const DEFAULT_USER_AGENT: &str = "Beacon Client";

/// The tracking API version stamped on every request.
const API_VERSION: u32 = 1;

/// Visitor-facing state guarded by one lock: identity, session and the
/// visit-scope variables every request inherits.
struct SessionState {
    site_id: u32,
    user_id: Option<String>,
    visitor_id: Option<String>,
    user_agent: String,
    language: Option<String>,
    screen_resolution: Option<String>,
    visit_variables: CustomVariables,
    application: Option<String>,
    location: Option<String>,
    /// UNIX timestamp of the first tracking call of the current session;
    /// `None` between sessions.
    session_start: Option<i64>,
    session_timeout: Duration,
    persistent: bool,
    disabled: bool,
}

/// The tracking entry point applications hold on to.
///
/// A tracker pairs the per-visitor session state with a background
/// [`Dispatcher`]: the `track_*` calls stamp a snapshot with identity and
/// session parameters, encode it, and queue it for delivery. Tracking calls
/// never block on the network; the returned serial can be polled through
/// [`Tracker::request_status`].
pub struct Tracker {
    dispatcher: Dispatcher,
    session: Mutex<SessionState>,
    visit_store: Arc<dyn VisitStore>,
}

impl Tracker {
    /// Build a tracker delivering to the given collector URL for the given
    /// site. Fails when the URL does not normalize to a collector address.
    ///
    /// Visit counters go to the platform data directory when one exists,
    /// otherwise they live for the process only.
    pub fn new(url: &str, site_id: u32) -> TrackerResult<Self> {
        let visit_store: Arc<dyn VisitStore> = match JsonVisitStore::default_path() {
            Some(path) => Arc::new(JsonVisitStore::new(path)),
            None => Arc::new(MemoryVisitStore::new()),
        };

        let dispatcher = Dispatcher::new(DispatcherConfig::default());
        dispatcher.set_api_url(url)?;

        Ok(Self {
            dispatcher,
            session: Mutex::new(SessionState {
                site_id,
                user_id: None,
                visitor_id: None,
                user_agent: DEFAULT_USER_AGENT.to_owned(),
                language: None,
                screen_resolution: None,
                visit_variables: CustomVariables::new(),
                application: None,
                location: None,
                session_start: None,
                session_timeout: DEFAULT_SESSION_TIMEOUT,
                persistent: false,
                disabled: false,
            }),
            visit_store,
        })
    }

    /// Replace the visit counter store. Takes effect for later sessions;
    /// records already stamped keep their values.
    pub fn set_visit_store(&mut self, store: Arc<dyn VisitStore>) {
        self.visit_store = store;
    }

    // Identity and visit configuration

    pub fn site_id(&self) -> u32 {
        self.session.lock().expect("lock poisoned").site_id
    }

    pub fn set_site_id(&self, id: u32) {
        self.session.lock().expect("lock poisoned").site_id = id;
    }

    pub fn user_id(&self) -> Option<String> {
        self.session.lock().expect("lock poisoned").user_id.clone()
    }

    /// Set the user id and derive the visitor id from it. User ids shorter
    /// than four bytes keep the visitor anonymous.
    pub fn set_user_id(&self, user_id: &str) {
        let mut s = self.session.lock().expect("lock poisoned");
        s.user_id = Some(user_id.to_owned());
        s.visitor_id = visitor_id_for_user(user_id);
    }

    pub fn visitor_id(&self) -> Option<String> {
        self.session.lock().expect("lock poisoned").visitor_id.clone()
    }

    pub fn set_user_agent(&self, user_agent: &str) {
        self.session.lock().expect("lock poisoned").user_agent = user_agent.to_owned();
    }

    pub fn set_language(&self, language: &str) {
        self.session.lock().expect("lock poisoned").language = Some(language.to_owned());
    }

    pub fn set_screen_resolution(&self, resolution: &str) {
        self.session.lock().expect("lock poisoned").screen_resolution =
            Some(resolution.to_owned());
    }

    /// Set a visit-scope custom variable, reusing the slot already holding
    /// this name or the first free one.
    pub fn set_visit_variable(&self, name: &str, value: &str) {
        let mut s = self.session.lock().expect("lock poisoned");
        s.visit_variables.set(name, value);
    }

    /// Set a visit-scope custom variable at an explicit 1-based slot.
    pub fn set_visit_variable_at(&self, slot: usize, name: &str, value: &str) {
        let mut s = self.session.lock().expect("lock poisoned");
        s.visit_variables.set_at(slot, name, value);
    }

    /// Name under which visit counters are stored for this application.
    /// Persistence needs both an application name and a user id.
    pub fn set_application(&self, application: &str) {
        self.session.lock().expect("lock poisoned").application = Some(application.to_owned());
    }

    /// Base URL that relative tracked paths are resolved against.
    pub fn set_location(&self, location: &str) {
        self.session.lock().expect("lock poisoned").location = Some(location.to_owned());
    }

    pub fn set_session_timeout(&self, timeout: Duration) -> TrackerResult<()> {
        if timeout.is_zero() {
            return Err(TrackerError::InvalidSessionTimeout);
        }
        self.session.lock().expect("lock poisoned").session_timeout = timeout;
        Ok(())
    }

    /// End the current session; the next tracking call starts a new visit.
    pub fn start_new_session(&self) {
        self.session.lock().expect("lock poisoned").session_start = None;
    }

    pub fn is_persistent(&self) -> bool {
        self.session.lock().expect("lock poisoned").persistent
    }

    /// Persistent trackers carry visit counters across sessions through the
    /// visit store.
    pub fn set_persistent(&self, persistent: bool) {
        self.session.lock().expect("lock poisoned").persistent = persistent;
    }

    pub fn is_disabled(&self) -> bool {
        self.session.lock().expect("lock poisoned").disabled
    }

    /// A disabled tracker keeps its configuration but refuses every
    /// tracking call.
    pub fn set_disabled(&self, disabled: bool) {
        self.session.lock().expect("lock poisoned").disabled = disabled;
    }

    // Delivery configuration, delegated to the dispatcher

    pub fn api_url(&self) -> Option<String> {
        self.dispatcher.api_url()
    }

    pub fn set_api_url(&self, url: &str) -> TrackerResult<()> {
        Ok(self.dispatcher.set_api_url(url)?)
    }

    pub fn method(&self) -> Method {
        self.dispatcher.method()
    }

    pub fn set_method(&self, method: Method) {
        self.dispatcher.set_method(method);
    }

    pub fn is_secure(&self) -> bool {
        self.dispatcher.is_secure()
    }

    pub fn set_secure(&self, secure: bool) {
        self.dispatcher.set_secure(secure);
    }

    pub fn set_connect_timeout(&self, timeout: Duration) {
        self.dispatcher.set_connect_timeout(timeout);
    }

    /// Delivery cadence in seconds: 0 sends on every submit, negative waits
    /// for explicit flushes, positive sends periodically.
    pub fn set_dispatch_interval(&self, secs: i64) {
        self.dispatcher.set_dispatch_interval(secs);
    }

    pub fn is_dry_run(&self) -> bool {
        self.dispatcher.is_dry_run()
    }

    /// Dry-run trackers go through every step except the network request.
    pub fn set_dry_run(&self, dry_run: bool) {
        self.dispatcher.set_dry_run(dry_run);
    }

    // Tracking

    /// Track a screen view. Screen-scope variables ride on
    /// [`EventSnapshot::screen`] via [`Tracker::track`].
    pub fn track_screen(&self, path: &str, action: Option<&str>) -> TrackerResult<u64> {
        self.track(EventSnapshot::screen(path, action))
    }

    /// Track a custom event under a category/action pair.
    pub fn track_event(
        &self,
        path: &str,
        category: &str,
        action: &str,
        name: Option<&str>,
        value: Option<f64>,
    ) -> TrackerResult<u64> {
        self.track(EventSnapshot::event(path, category, action, name, value))
    }

    /// Track a goal conversion.
    pub fn track_goal(&self, path: &str, goal_id: u32, revenue: Option<f64>) -> TrackerResult<u64> {
        self.track(EventSnapshot::goal(path, goal_id, revenue))
    }

    /// Track a followed external link.
    pub fn track_outlink(&self, url: &str) -> TrackerResult<u64> {
        self.track(EventSnapshot::outlink(url))
    }

    /// Track a content impression.
    pub fn track_impression(
        &self,
        path: &str,
        name: &str,
        piece: Option<&str>,
        target: Option<&str>,
    ) -> TrackerResult<u64> {
        self.track(EventSnapshot::impression(path, name, piece, target))
    }

    /// Track an interaction with previously shown content.
    pub fn track_interaction(
        &self,
        path: &str,
        name: &str,
        piece: Option<&str>,
        target: Option<&str>,
        interaction: &str,
    ) -> TrackerResult<u64> {
        self.track(EventSnapshot::interaction(path, name, piece, target, interaction))
    }

    /// Track an arbitrary snapshot.
    ///
    /// Stamps identity and session parameters, resolves a relative path
    /// against the base location, encodes the snapshot and queues it.
    /// Returns the delivery serial. Refuses when the tracker is disabled,
    /// the site id is zero or the path is empty.
    pub fn track(&self, mut snapshot: EventSnapshot) -> TrackerResult<u64> {
        self.prepare(&mut snapshot)?;
        let query = snapshot.serialize(QueryFormat::Url);
        let serial = self.dispatcher.submit(query)?;
        debug!(serial, path = %snapshot.path, "tracking request queued");
        Ok(serial)
    }

    /// Fill the session-derived fields of a snapshot.
    fn prepare(&self, snapshot: &mut EventSnapshot) -> TrackerResult<()> {
        let mut s = self.session.lock().expect("lock poisoned");
        if s.disabled {
            return Err(TrackerError::Disabled);
        }
        if s.site_id == 0 {
            return Err(TrackerError::MissingSiteId);
        }
        if snapshot.path.is_empty() {
            return Err(TrackerError::EmptyPath);
        }

        let now = Utc::now().timestamp();
        let timeout = s.session_timeout.as_secs() as i64;
        let expired = s.session_start.map_or(true, |start| now - start > timeout);
        if expired {
            // Visit-scope parameters ride on the first request of a session
            // only; the collector carries them for the rest of the visit.
            snapshot.new_session = true;
            snapshot.user_agent = Some(s.user_agent.clone());
            snapshot.language = s.language.clone();
            snapshot.screen_resolution = s.screen_resolution.clone();

            if s.persistent {
                if let (Some(app), Some(user)) = (s.application.as_deref(), s.user_id.as_deref())
                {
                    let mut record = self.visit_store.load(app, user);
                    record.visit_count += 1;
                    if record.first_visit_ts.is_none() {
                        record.first_visit_ts = Some(now);
                    }
                    snapshot.visit_count = Some(record.visit_count);
                    snapshot.first_visit_ts = record.first_visit_ts;
                    snapshot.previous_visit_ts = record.last_visit_ts;
                    record.last_visit_ts = Some(now);
                    self.visit_store.store(app, user, record);
                }
            }

            s.session_start = Some(now);
        }

        if !snapshot.path.contains(':') {
            snapshot.path = resolve_path(s.location.as_deref(), &snapshot.path);
        }

        snapshot.site_id = s.site_id;
        snapshot.user_id = s.user_id.clone();
        snapshot.visitor_id = s.visitor_id.clone();
        snapshot.api_version = API_VERSION;
        snapshot.visit_variables = s.visit_variables.clone();
        snapshot.random = rand::random();
        Ok(())
    }

    // Delivery feedback and lifecycle

    /// Ask the delivery worker to send whatever is queued, without waiting.
    pub fn flush(&self) {
        if !self.is_disabled() {
            self.dispatcher.flush();
        }
    }

    /// Delivery outcome for a serial returned by a tracking call.
    pub fn request_status(&self, serial: u64) -> RequestStatus {
        self.dispatcher.request_status(serial)
    }

    /// Number of tracking requests not yet handed to the network.
    pub fn pending_count(&self) -> usize {
        self.dispatcher.pending_count()
    }

    /// Stop the delivery worker, giving the in-flight batch the configured
    /// grace period. Requests still queued stay pending; a later tracking
    /// call restarts delivery.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}

/// Resolve a relative tracked path against the configured base location.
fn resolve_path(location: Option<&str>, path: &str) -> String {
    match location {
        Some(base) if !base.is_empty() => {
            let mut url = base.trim_end_matches('/').to_owned();
            if !path.starts_with('/') {
                url.push('/');
            }
            url.push_str(path);
            url
        }
        _ => path.to_owned(),
    }
}
