//! The HTTP seam between the delivery worker and the network.

use async_trait::async_trait;
use beacon_core::Method;
use std::time::Duration;
use thiserror::Error;

/// Content type set on every collector request, GET or POST.
pub(crate) const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// User agent of the tracking client itself.
const CLIENT_USER_AGENT: &str = "Beacon Client";

/// One fully resolved HTTP request, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    /// Full URL including scheme; for GET the encoded payload is already
    /// appended as a query string.
    pub url: String,
    /// JSON body for POST requests.
    pub body: Option<String>,
}

/// Transport-level failure.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection, DNS or timeout failure from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request could not be constructed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Performs the actual network call. The worker only decides what and when
/// to send; everything below lives behind this trait so tests can swap in a
/// recording fake.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one HTTP request and return the response status code.
    async fn send(&self, request: &WireRequest) -> Result<u16, TransportError>;
}

/// Production transport over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given connection timeout.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &WireRequest) -> Result<u16, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self
                .client
                .post(&request.url)
                .body(request.body.clone().unwrap_or_default()),
        };

        let response = builder
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}
