//! Forwarding core.
//!
//! # Data Flow
//! ```text
//! host handler
//!     → Forwarder::forward(method, path, request, sink, request_type, options)
//!         → options.rs (fresh per call, resolved against ForwardDefaults)
//!         → encoder (selected by request_type.rs)
//!         → client (with interceptor.rs hooks attached)
//!         → http::response::render
//! ```
//!
//! # Design Decisions
//! - No state is shared across calls except the client and the defaults
//! - Exactly one status write, then one body write, per call

pub mod forwarder;
pub mod interceptor;
pub mod options;
pub mod request_type;

pub use forwarder::Forwarder;
pub use interceptor::{
    FormInterceptor, Interceptors, JsonInterceptor, MultipartInterceptor, RequestInterceptor, UrlInterceptor,
};
pub use options::{EffectiveOptions, ForwardDefaults, ForwardOptions};
pub use request_type::ProxyRequestType;
