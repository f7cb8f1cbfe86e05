//! Request-forwarding layer for API clients.
//!
//! A host service hands an inbound request to a [`Forwarder`], which
//! reshapes the body according to a [`ProxyRequestType`], runs the
//! configured interceptors, sends the request upstream through an
//! [`UpstreamClient`] and renders the upstream response into a
//! [`ResponseSink`].
//!
//! ```text
//! inbound request
//!     → proxy (Forwarder, options, interceptors)
//!     → encoder (none | raw | form | multipart)
//!     → client (hyper-util pool, or any tower Service)
//!     → http::response (header transfer, status, JSON rewrite or stream)
//!     → sink
//! ```

pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod resilience;

pub use client::{ApiRequest, HyperClient, ServiceClient, UpstreamClient};
pub use config::schema::ProxyConfig;
pub use encoder::{FormValues, MultipartWriter};
pub use error::{ForwardError, ForwardResult};
pub use http::{ResponseBuilderSink, ResponseSink};
pub use proxy::{ForwardDefaults, ForwardOptions, Forwarder, ProxyRequestType};
