//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler on the configured path
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Bind server to listener and serve until shutdown
//! - Hand each request to the `Relay` and render the outcome

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{header::InvalidHeaderValue, HeaderMap, HeaderValue, Method, Request, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validate_config, RelayConfig, ValidationError};
use crate::http::request::{inbound_request, request_id, UuidRequestId};
use crate::observability::metrics;
use crate::relay::{HttpClient, Relay, RelayError, RelaySettings, UpstreamClient};

/// Error building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid default user agent: {0}")]
    UserAgent(#[from] InvalidHeaderValue),

    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    InvalidConfig(Vec<ValidationError>),
}

/// Application state injected into handlers.
pub struct AppState<C> {
    pub relay: Arc<Relay<C>>,
    pub target_param: Arc<str>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
            target_param: Arc::clone(&self.target_param),
        }
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server that reaches upstreams through `reqwest`.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let client = HttpClient::new(&config.upstream, &config.timeouts)?;
        Self::with_client(config, client)
    }

    /// Create a server around any upstream client.
    pub fn with_client<C: UpstreamClient>(config: RelayConfig, client: C) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ServerError::InvalidConfig)?;
        let settings = RelaySettings {
            default_user_agent: HeaderValue::from_str(&config.relay.default_user_agent)?,
        };
        let state = AppState {
            relay: Arc::new(Relay::new(client, settings)),
            target_param: Arc::from(config.relay.target_param.as_str()),
        };

        let router = build_router(&config, state);
        Ok(Self { router, config })
    }

    /// The fully layered router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.relay.path,
            target_param = %self.config.relay.target_param,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router<C: UpstreamClient>(config: &RelayConfig, state: AppState<C>) -> Router {
    Router::new()
        .route(&config.relay.path, any(relay_handler::<C>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request.headers()),
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

/// Relay handler: every method on the configured path.
async fn relay_handler<C: UpstreamClient>(
    State(state): State<AppState<C>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let method_seen = method.clone();
    let inbound = inbound_request(method, &uri, headers, body, &state.target_param);

    let response = match state.relay.forward(inbound).await {
        Ok(upstream) => upstream.into_response(),
        Err(err) => {
            match &err {
                RelayError::UpstreamUnreachable { cause, .. } => {
                    metrics::record_upstream_failure(cause.kind());
                }
                _ => tracing::warn!(error = %err, "Rejected relay request"),
            }
            err.into_response()
        }
    };

    metrics::record_request(&method_seen, response.status().as_u16(), start);
    response
}
