//! Response handling.
//!
//! # Responsibilities
//! - Relay the upstream response to the client unchanged
//! - Render `RelayError`s through `RelayError::reply`
//!
//! # Design Decisions
//! - Upstream headers are copied without filtering, hop-by-hop and framing
//!   headers (`Transfer-Encoding`, `Content-Encoding`, `Connection`) included
//! - The body only advertises an exact length when the copied framing headers
//!   agree with it; otherwise hyper would trust the length, drop a relayed
//!   `Transfer-Encoding: chunked` and send the buffered body with no framing
//! - CORS headers replace upstream ones; an upstream `x-request-id` is kept

use std::convert::Infallible;

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use crate::relay::{ErrorBody, ErrorReply, HeaderList, OutboundResponse, RelayError};

/// Wrap the buffered upstream body so its size hint does not contradict the
/// relayed framing headers.
fn relay_body(headers: &HeaderList, body: Bytes) -> Body {
    let chunked = headers.contains(header::TRANSFER_ENCODING.as_str());
    let length_differs = headers
        .get(header::CONTENT_LENGTH.as_str())
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok())
        .is_some_and(|declared| declared != body.len());

    if chunked || length_differs {
        Body::from_stream(futures_util::stream::once(async move {
            Ok::<_, Infallible>(body)
        }))
    } else {
        Body::from(body)
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let body = relay_body(&self.headers, self.body);
        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        for (name, value) in self.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        response
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let ErrorReply { status, body } = self.reply();
        match body {
            ErrorBody::Json(value) => (status, Json(value)).into_response(),
            ErrorBody::Raw(bytes) => (status, bytes).into_response(),
        }
    }
}
