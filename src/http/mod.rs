//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, CORS, timeout, body limit)
//!     → request.rs (request ID, split query into target + forwarded params)
//!     → relay::Relay::forward
//!     → response.rs (relay upstream response, or render RelayError)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
