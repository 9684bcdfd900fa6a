//! Relay error taxonomy and its mapping to HTTP replies.

use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::{json, Value};
use thiserror::Error;

/// Failure reported by an `UpstreamClient` before any response arrived.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection not established within {0:?}")]
    ConnectTimeout(Duration),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::ConnectTimeout(_) => "connect_timeout",
            TransportError::Timeout(_) => "timeout",
            TransportError::Connect(_) => "connect",
            TransportError::Other(_) => "other",
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing target url")]
    MissingTarget,

    #[error("invalid target url {input:?}: {reason}")]
    InvalidTargetUrl { input: String, reason: String },

    #[error("upstream {target} unreachable: {cause}")]
    UpstreamUnreachable {
        target: String,
        #[source]
        cause: TransportError,
    },

    /// The upstream answered with a non-2xx status. Only produced by
    /// `OutboundResponse::error_for_status`.
    #[error("upstream responded with {status}")]
    UpstreamError { status: StatusCode, body: Bytes },
}

/// Body of an error reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(Value),
    /// Upstream bytes relayed as-is.
    Raw(Bytes),
}

/// Status and body the HTTP surface sends for a `RelayError`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReply {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingTarget => StatusCode::BAD_REQUEST,
            RelayError::InvalidTargetUrl { .. } => StatusCode::BAD_REQUEST,
            RelayError::UpstreamUnreachable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UpstreamError { status, .. } => *status,
        }
    }

    /// Map this error to the reply sent to the caller.
    ///
    /// Diagnostics are the error's display text, never a backtrace.
    pub fn reply(&self) -> ErrorReply {
        let body = match self {
            RelayError::MissingTarget => ErrorBody::Json(json!({
                "error": "missing target url",
            })),
            RelayError::InvalidTargetUrl { reason, .. } => ErrorBody::Json(json!({
                "error": "invalid target url",
                "details": reason,
            })),
            RelayError::UpstreamUnreachable { cause, .. } => ErrorBody::Json(json!({
                "error": "upstream unreachable",
                "details": cause.to_string(),
            })),
            RelayError::UpstreamError { body, .. } => ErrorBody::Raw(body.clone()),
        };

        ErrorReply {
            status: self.status_code(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_target_reply() {
        let reply = RelayError::MissingTarget.reply();
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, ErrorBody::Json(json!({ "error": "missing target url" })));
    }

    #[test]
    fn test_invalid_target_reply_has_details() {
        let err = RelayError::InvalidTargetUrl {
            input: "nope".into(),
            reason: "relative URL without a base".into(),
        };
        let reply = err.reply();
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        match reply.body {
            ErrorBody::Json(v) => {
                assert_eq!(v["error"], "invalid target url");
                assert_eq!(v["details"], "relative URL without a base");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_reply_is_500() {
        let err = RelayError::UpstreamUnreachable {
            target: "http://127.0.0.1:1/".into(),
            cause: TransportError::Connect("tcp connect error: Connection refused".into()),
        };
        let reply = err.reply();
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        match reply.body {
            ErrorBody::Json(v) => {
                assert_eq!(v["error"], "upstream unreachable");
                assert!(v["details"].as_str().unwrap().contains("Connection refused"));
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_upstream_error_is_passthrough() {
        let err = RelayError::UpstreamError {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(b"not found"),
        };
        let reply = err.reply();
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body, ErrorBody::Raw(Bytes::from_static(b"not found")));
    }

    #[test]
    fn test_transport_kind_labels() {
        assert_eq!(
            TransportError::ConnectTimeout(Duration::from_secs(1)).kind(),
            "connect_timeout"
        );
        assert_eq!(TransportError::Timeout(Duration::from_secs(1)).kind(), "timeout");
        assert_eq!(TransportError::Connect(String::new()).kind(), "connect");
        assert_eq!(TransportError::Other(String::new()).kind(), "other");
    }
}
