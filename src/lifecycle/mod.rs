//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Defaults → Config file → PORT env → CLI flags → Validate
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then listener
//! - In-flight requests are bounded by the request timeout, so draining ends

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
