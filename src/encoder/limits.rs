//! Request body reading and size limits.
//!
//! # Responsibilities
//! - Read inbound bodies fully when an encoder needs the whole payload
//! - Enforce maximum body sizes (form and multipart)
//! - Reject oversized uploads from the declared Content-Length before reading
//!
//! # Design Decisions
//! - Limits checked before full parsing where the length is declared
//! - Exceeding a limit is reported separately from I/O failures so each
//!   encoder can map it to its own error kind

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap};
use futures_util::StreamExt;

use crate::error::{ForwardError, ForwardResult};

/// Outcome of a bounded body read.
#[derive(Debug)]
pub enum Limited {
    Complete(Bytes),
    Exceeded,
}

/// Read the whole body into memory. The body is consumed and released on return.
pub async fn read_to_end(body: Body) -> ForwardResult<Bytes> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(ForwardError::io)
}

/// Read the whole body, stopping as soon as more than `limit` bytes arrive.
pub async fn read_to_limit(body: Body, limit: u64) -> ForwardResult<Limited> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ForwardError::io)?;
        if (buf.len() + chunk.len()) as u64 > limit {
            return Ok(Limited::Exceeded);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Limited::Complete(Bytes::from(buf)))
}

/// Fail with `SizeLimit` if the request declares a body larger than `limit`.
pub fn check_declared_length(headers: &HeaderMap, limit: u64) -> ForwardResult<()> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    match declared {
        Some(len) if len > limit => Err(ForwardError::SizeLimit { limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_read_within_limit() {
        let out = read_to_limit(Body::from("hello"), 5).await.unwrap();
        assert!(matches!(out, Limited::Complete(ref b) if b.as_ref() == b"hello"));
    }

    #[tokio::test]
    async fn test_read_over_limit() {
        let out = read_to_limit(Body::from("hello!"), 5).await.unwrap();
        assert!(matches!(out, Limited::Exceeded));
    }

    #[test]
    fn test_declared_length() {
        let mut headers = HeaderMap::new();
        assert!(check_declared_length(&headers, 10).is_ok());

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_declared_length(&headers, 10).is_ok());

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("11"));
        assert!(matches!(
            check_declared_length(&headers, 10),
            Err(ForwardError::SizeLimit { limit: 10 })
        ));
    }
}
