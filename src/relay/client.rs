//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Define the seam between the relay and the transport (`UpstreamClient`)
//! - Provide the production transport over `reqwest`
//! - Enforce connect and total timeouts on every outbound call
//!
//! # Design Decisions
//! - Bodies are read fully as bytes; no decompression, no charset handling
//! - Transport failures are flattened to text with the whole cause chain

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::relay::error::TransportError;
use crate::relay::headers::HeaderList;
use crate::relay::types::{OutboundRequest, OutboundResponse};

/// Performs one outbound call.
pub trait UpstreamClient: Send + Sync + 'static {
    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<OutboundResponse, TransportError>> + Send;
}

/// `reqwest`-backed upstream client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    connect_timeout: Duration,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let connect_timeout = Duration::from_secs(timeouts.connect_secs);
        let timeout = Duration::from_secs(timeouts.upstream_secs);
        let redirects = if upstream.follow_redirects {
            reqwest::redirect::Policy::limited(upstream.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .redirect(redirects);
        if !upstream.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            inner: builder.build()?,
            connect_timeout,
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        self.classify_flags(err.is_timeout(), err.is_connect(), || error_chain(&err))
    }

    /// A connect timeout sets both flags and is bounded by the connect limit,
    /// not the total one.
    fn classify_flags(
        &self,
        timed_out: bool,
        connecting: bool,
        detail: impl FnOnce() -> String,
    ) -> TransportError {
        match (timed_out, connecting) {
            (true, true) => TransportError::ConnectTimeout(self.connect_timeout),
            (true, false) => TransportError::Timeout(self.timeout),
            (false, true) => TransportError::Connect(detail()),
            (false, false) => TransportError::Other(detail()),
        }
    }
}

impl UpstreamClient for HttpClient {
    async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        let mut builder = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers.to_header_map());
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let headers = HeaderList::from(response.headers());
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(OutboundResponse {
            status,
            headers,
            body,
        })
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
