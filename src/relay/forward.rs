//! The forwarding step: inbound request in, upstream response out.

use axum::http::{header, HeaderValue};
use url::Url;

use crate::relay::client::UpstreamClient;
use crate::relay::error::RelayError;
use crate::relay::headers::HeaderList;
use crate::relay::types::{InboundRequest, OutboundRequest, OutboundResponse};

/// User agent sent when the caller did not send one.
pub const DEFAULT_USER_AGENT: &str = concat!("cors-relay/", env!("CARGO_PKG_VERSION"));

/// Per-relay settings that shape outbound requests.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub default_user_agent: HeaderValue,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            default_user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }
}

/// Forwards inbound requests to the target named in their query string.
///
/// Holds no per-request state; one `Relay` serves any number of concurrent
/// `forward` calls.
#[derive(Debug)]
pub struct Relay<C> {
    client: C,
    settings: RelaySettings,
}

impl<C: UpstreamClient> Relay<C> {
    pub fn new(client: C, settings: RelaySettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Relay one request. Exactly one outbound call is made when the target
    /// is valid; none otherwise.
    ///
    /// A non-2xx upstream status is returned as `Ok`.
    pub async fn forward(&self, inbound: InboundRequest) -> Result<OutboundResponse, RelayError> {
        let outbound = build_outbound(inbound, &self.settings.default_user_agent)?;
        let target = outbound.url.to_string();

        tracing::info!(method = %outbound.method, upstream = %target, "Proxying request");

        match self.client.execute(outbound).await {
            Ok(response) => {
                if !response.status.is_success() {
                    tracing::warn!(
                        upstream = %target,
                        status = %response.status,
                        "Upstream returned non-success status"
                    );
                }
                Ok(response)
            }
            Err(cause) => {
                tracing::error!(upstream = %target, error = %cause, "Upstream unreachable");
                Err(RelayError::UpstreamUnreachable { target, cause })
            }
        }
    }
}

/// Parse the raw target into an absolute `http`/`https` URL.
pub fn resolve_target(raw: Option<&str>) -> Result<Url, RelayError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return Err(RelayError::MissingTarget),
    };

    let invalid = |reason: String| RelayError::InvalidTargetUrl {
        input: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Derive the outbound request.
///
/// Forwarded parameters go after any query the target already has, in
/// inbound order, duplicates included, with the caller's encoding kept
/// byte for byte. Only `User-Agent` is carried over from
/// the inbound headers; `Host` is left for the transport to derive from the
/// URL.
pub fn build_outbound(
    inbound: InboundRequest,
    default_user_agent: &HeaderValue,
) -> Result<OutboundRequest, RelayError> {
    let mut url = resolve_target(inbound.target.as_deref())?;

    if !inbound.query.is_empty() {
        let mut query = url.query().unwrap_or("").to_string();
        for param in &inbound.query {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(param.as_raw());
        }
        url.set_query(Some(&query));
    }

    let user_agent = inbound
        .headers
        .get(header::USER_AGENT.as_str())
        .cloned()
        .unwrap_or_else(|| default_user_agent.clone());

    let mut headers = HeaderList::new();
    headers.insert(header::USER_AGENT, user_agent);

    Ok(OutboundRequest {
        method: inbound.method,
        url,
        headers,
        body: inbound.body,
    })
}
