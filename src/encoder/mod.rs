//! Request encoders.
//!
//! # Data Flow
//! ```text
//! inbound (method, headers, body)
//!     → ProxyRequestType selects exactly one strategy
//!         None          → empty body, no content type
//!         Raw           → raw.rs (passthrough stream or JSON rewrite)
//!         Form          → form.rs (url-encoded re-encode)
//!         MultipartForm → multipart.rs (field/file re-encode)
//!     → EncodedBody (body, content type)
//! ```
//!
//! # Design Decisions
//! - An encoder returns a fully prepared body or an error, never half of one
//! - Only Raw passthrough streams; every other strategy buffers in memory

pub mod form;
pub mod json;
pub mod limits;
pub mod multipart;
pub mod multipart_writer;
pub mod raw;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method};

use crate::error::ForwardResult;
use crate::proxy::options::EffectiveOptions;
use crate::proxy::ProxyRequestType;

pub use form::FormValues;
pub use multipart_writer::MultipartWriter;

/// Outbound body produced by an encoder.
#[derive(Debug)]
pub struct EncodedBody {
    pub body: Body,
    /// Replaces the inbound `Content-Type` when set.
    pub content_type: Option<HeaderValue>,
}

impl EncodedBody {
    pub fn new(body: Body, content_type: HeaderValue) -> Self {
        Self {
            body,
            content_type: Some(content_type),
        }
    }

    pub fn empty() -> Self {
        Self {
            body: Body::empty(),
            content_type: None,
        }
    }
}

/// Run the encoder selected by `request_type`.
pub async fn encode(
    request_type: ProxyRequestType,
    method: &Method,
    headers: &HeaderMap,
    body: Body,
    options: &EffectiveOptions,
) -> ForwardResult<EncodedBody> {
    match request_type {
        ProxyRequestType::Raw => raw::encode(headers, body, options).await,
        ProxyRequestType::Form => form::encode(method, headers, body, options).await,
        ProxyRequestType::MultipartForm => multipart::encode(headers, body, options).await,
        ProxyRequestType::None => Ok(EncodedBody::empty()),
    }
}

/// Lowercased media type of a `Content-Type` value, parameters stripped.
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("Multipart/Form-Data; boundary=x"), "multipart/form-data");
        assert_eq!(media_type(" application/json "), "application/json");
        assert_eq!(media_type(""), "");
    }

    #[tokio::test]
    async fn test_none_yields_empty_body() {
        let encoded = encode(
            ProxyRequestType::None,
            &Method::POST,
            &HeaderMap::new(),
            Body::from("ignored"),
            &EffectiveOptions::default(),
        )
        .await
        .unwrap();

        assert!(encoded.content_type.is_none());
        assert!(limits::read_to_end(encoded.body).await.unwrap().is_empty());
    }
}
