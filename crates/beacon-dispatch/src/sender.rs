//! One delivery attempt against the collector.

use crate::transport::{Transport, WireRequest};
use beacon_core::Method;
use std::sync::Arc;
use tracing::{error, info};

/// The configuration fields one delivery attempt depends on, captured under
/// the dispatcher lock at the start of a drain pass.
#[derive(Debug, Clone)]
pub(crate) struct SendTarget {
    pub host: String,
    pub path: String,
    pub secure: bool,
    pub dry_run: bool,
}

impl SendTarget {
    fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

/// Wraps the transport with the success policy: a send counts as delivered
/// iff a response arrived with a 2xx status. No retry happens here; the
/// worker records failures and the application decides whether to resubmit.
pub(crate) struct RequestSender {
    transport: Arc<dyn Transport>,
}

impl RequestSender {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue one request. For GET, `message` is the `?`-query appended to
    /// the collector path; for POST it is the JSON body.
    ///
    /// In dry-run mode no network call is made: the would-be request is
    /// logged and reported as delivered so downstream bookkeeping proceeds.
    pub(crate) async fn send(&self, target: &SendTarget, method: Method, message: &str) -> bool {
        if target.dry_run {
            info!(
                host = %target.host,
                path = %target.path,
                message = %message,
                "dry run, skipping network call"
            );
            return true;
        }

        let request = match method {
            Method::Get => WireRequest {
                method,
                url: format!("{}://{}{}{}", target.scheme(), target.host, target.path, message),
                body: None,
            },
            Method::Post => WireRequest {
                method,
                url: format!("{}://{}{}", target.scheme(), target.host, target.path),
                body: Some(message.to_string()),
            },
        };

        match self.transport.send(&request).await {
            Ok(status) if (200..300).contains(&status) => true,
            Ok(status) => {
                error!(host = %target.host, status, "collector rejected tracking request");
                false
            }
            Err(e) => {
                error!(host = %target.host, error = %e, "failed to reach collector");
                false
            }
        }
    }
}
