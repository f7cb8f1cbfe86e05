//! HTTP plumbing around the forwarding core.
//!
//! # Data Flow
//! ```text
//! inbound Request<Body>
//!     → request.rs (derive target, seed outbound headers)
//!     → [encoder + client]
//!     → response.rs (header transfer, status, JSON rewrite or stream)
//!     → sink.rs (ResponseSink, committed once)
//! ```

pub mod request;
pub mod response;
pub mod sink;

pub use request::{inbound_target, relative_target, seed_headers};
pub use response::render;
pub use sink::{ResponseBuilderSink, ResponseSink};
