//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the caller sent none
//! - Turn the extracted axum request pieces into an `InboundRequest`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The query string is split here, once; the relay never sees the raw URI

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use bytes::Bytes;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::relay::{HeaderList, InboundRequest};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Issues a fresh UUID v4 for every request without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID set by `SetRequestIdLayer`, or `"unknown"` outside it.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Assemble an `InboundRequest` from extracted request parts.
pub fn inbound_request(
    method: Method,
    uri: &Uri,
    headers: HeaderMap,
    body: Bytes,
    target_param: &str,
) -> InboundRequest {
    InboundRequest::from_query(
        method,
        uri.query(),
        target_param,
        HeaderList::from(headers),
        Some(body),
    )
}
