//! Request-forwarding relay.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, reserved target param, other params, headers, body)
//!     → forward.rs (resolve target, append params, pick User-Agent)
//!     → OutboundRequest
//!     → client.rs (UpstreamClient::execute, bounded by timeouts)
//!     → OutboundResponse (status, headers, body relayed verbatim)
//!       or RelayError (error.rs, mapped to a reply by RelayError::reply)
//! ```
//!
//! # Design Decisions
//! - No state outlives a request; the relay is shared immutably
//! - Non-2xx upstream answers are responses, not errors
//! - One outbound attempt per inbound request, no retries

pub mod client;
pub mod error;
pub mod forward;
pub mod headers;
pub mod types;

pub use client::{HttpClient, UpstreamClient};
pub use error::{ErrorBody, ErrorReply, RelayError, TransportError};
pub use forward::{build_outbound, resolve_target, Relay, RelaySettings, DEFAULT_USER_AGENT};
pub use headers::HeaderList;
pub use types::{InboundRequest, OutboundRequest, OutboundResponse, QueryParam};
