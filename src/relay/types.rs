//! Request and response descriptions exchanged by the relay.

use std::borrow::Cow;

use axum::http::{Method, StatusCode};
use bytes::Bytes;
use url::Url;

use crate::relay::error::RelayError;
use crate::relay::headers::HeaderList;

/// One `key=value` piece of an inbound query string, kept exactly as the
/// caller encoded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    raw: String,
}

impl QueryParam {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The piece as received, percent-encoding untouched.
    pub fn as_raw(&self) -> &str {
        &self.raw
    }

    /// Decoded key. Invalid UTF-8 is replaced, so only use this for
    /// matching and display.
    pub fn key(&self) -> Cow<'_, str> {
        let raw_key = self.raw.split('=').next().unwrap_or("");
        decode_component(raw_key)
    }

    /// Decoded value, lossy in the same way as [`QueryParam::key`].
    pub fn value(&self) -> Cow<'_, str> {
        match self.raw.split_once('=') {
            Some((_, raw_value)) => decode_component(raw_value),
            None => Cow::Borrowed(""),
        }
    }
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(|c: char| c == '%' || c == '+') {
        return Cow::Borrowed(raw);
    }
    // Everything after the first `=` is the value, so `raw` may hold `=` too.
    let pair = format!("k={raw}");
    let decoded = url::form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    Cow::Owned(decoded)
}

/// A request as received by the relay.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Decoded value of the reserved query parameter, still unparsed as a URL.
    pub target: Option<String>,
    /// Every other query parameter, in the order received, still encoded.
    pub query: Vec<QueryParam>,
    pub headers: HeaderList,
    pub body: Option<Bytes>,
}

impl InboundRequest {
    /// Split a raw (still percent-encoded) query string into the target and
    /// the parameters to forward.
    ///
    /// The first occurrence of `reserved` is the target. Later occurrences
    /// are dropped; the reserved key is never forwarded. Forwarded pieces
    /// keep their original bytes, so values that are not valid UTF-8 once
    /// decoded survive the trip.
    pub fn from_query(
        method: Method,
        raw_query: Option<&str>,
        reserved: &str,
        headers: HeaderList,
        body: Option<Bytes>,
    ) -> Self {
        let mut target = None;
        let mut query = Vec::new();

        for piece in raw_query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
            let param = QueryParam::from_raw(piece);
            if param.key() == reserved {
                if target.is_none() {
                    target = Some(param.value().into_owned());
                }
            } else {
                query.push(param);
            }
        }

        Self {
            method,
            target,
            query,
            headers,
            body: body.filter(|b| !b.is_empty()),
        }
    }
}

/// The request the relay sends upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderList,
    pub body: Option<Bytes>,
}

/// The upstream's answer, relayed verbatim.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderList,
    pub body: Bytes,
}

impl OutboundResponse {
    /// Turn a non-2xx response into `RelayError::UpstreamError`.
    ///
    /// `forward` never does this itself: an upstream 404 is a successful
    /// relay. Callers that want the error channel opt in here.
    pub fn error_for_status(self) -> Result<Self, RelayError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(RelayError::UpstreamError {
                status: self.status,
                body: self.body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(query: Option<&str>) -> InboundRequest {
        InboundRequest::from_query(Method::GET, query, "url", HeaderList::new(), None)
    }

    fn raw(query: &[QueryParam]) -> Vec<&str> {
        query.iter().map(QueryParam::as_raw).collect()
    }

    #[test]
    fn test_target_is_separated_from_forwarded_params() {
        let req = inbound(Some("a=1&url=http%3A%2F%2Fexample.com%2Fx&b=2&a=3"));

        assert_eq!(req.target.as_deref(), Some("http://example.com/x"));
        assert_eq!(raw(&req.query), vec!["a=1", "b=2", "a=3"]);
    }

    #[test]
    fn test_repeated_reserved_key_is_dropped() {
        let req = inbound(Some("url=http://one.test&url=http://two.test&k=v"));

        assert_eq!(req.target.as_deref(), Some("http://one.test"));
        assert_eq!(raw(&req.query), vec!["k=v"]);
    }

    #[test]
    fn test_encoded_reserved_key_is_recognised() {
        let req = inbound(Some("%75rl=http://example.com/&k=v"));
        assert_eq!(req.target.as_deref(), Some("http://example.com/"));
        assert_eq!(raw(&req.query), vec!["k=v"]);
    }

    #[test]
    fn test_params_keep_their_encoding() {
        let req = inbound(Some("url=http://example.com/&k=%FF%FE&t=a%2Bb+c&flag&&e="));

        assert_eq!(raw(&req.query), vec!["k=%FF%FE", "t=a%2Bb+c", "flag", "e="]);
        assert_eq!(req.query[1].key(), "t");
        assert_eq!(req.query[1].value(), "a+b c");
        assert_eq!(req.query[2].key(), "flag");
        assert_eq!(req.query[2].value(), "");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let req = inbound(Some("sig=a%3Db=c&url=http://example.com/?x=1"));
        assert_eq!(req.target.as_deref(), Some("http://example.com/?x=1"));
        assert_eq!(req.query[0].value(), "a=b=c");
    }

    #[test]
    fn test_no_query() {
        let req = inbound(None);
        assert!(req.target.is_none());
        assert!(req.query.is_empty());
    }

    #[test]
    fn test_empty_body_is_none() {
        let req = InboundRequest::from_query(
            Method::POST,
            None,
            "url",
            HeaderList::new(),
            Some(Bytes::new()),
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn test_error_for_status() {
        let ok = OutboundResponse {
            status: StatusCode::OK,
            headers: HeaderList::new(),
            body: Bytes::from_static(b"fine"),
        };
        assert!(ok.error_for_status().is_ok());

        let missing = OutboundResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderList::new(),
            body: Bytes::from_static(b"not found"),
        };
        match missing.error_for_status() {
            Err(RelayError::UpstreamError { status, body }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(&body[..], b"not found");
            }
            other => panic!("expected UpstreamError, got {:?}", other),
        }
    }
}
