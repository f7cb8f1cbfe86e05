//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound send to upstream:
//!     → timeouts.rs (enforce the per-call request timeout)
//!     → error returned unchanged to the forwarder
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every outbound send has a deadline
//! - No retries: a failed send aborts the forwarding call
//! - Inbound reads are bounded by the host server, not here

pub mod timeouts;

pub use timeouts::with_timeout;
