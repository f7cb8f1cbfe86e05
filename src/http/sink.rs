//! Response sinks.
//!
//! A sink is where the renderer writes the client-facing response. The
//! contract mirrors a classic response writer:
//!
//! 1. headers may be staged through `headers_mut`,
//! 2. `write_status` commits the status code exactly once; from then on the
//!    client will see that status whatever happens next,
//! 3. `write_body` hands over the single body; the staged header block goes
//!    out together with it.
//!
//! Errors after step 2 cannot change the status. They are returned to the
//! host for logging only.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;

use crate::error::{ForwardError, ForwardResult};

/// Client-facing response writer supplied by the host.
#[async_trait]
pub trait ResponseSink: Send {
    /// Headers staged for the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status code. Only the first call takes effect.
    fn write_status(&mut self, status: StatusCode);

    /// Whether the status code has been committed.
    fn is_committed(&self) -> bool;

    /// Write the response body. At most one body write per response.
    async fn write_body(&mut self, body: Body) -> ForwardResult<()>;
}

/// Sink that assembles an axum [`Response`].
///
/// The body is handed through as a stream, so an upstream body is never
/// buffered here. Failures while the client drains it happen after
/// `forward` returned and are reported through `tracing`.
#[derive(Debug, Default)]
pub struct ResponseBuilderSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Body>,
}

impl ResponseBuilderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait]
impl ResponseSink for ResponseBuilderSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(committed) => {
                tracing::warn!(committed = %committed, ignored = %status, "Status already written");
            }
            None => self.status = Some(status),
        }
    }

    fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    async fn write_body(&mut self, body: Body) -> ForwardResult<()> {
        if self.body.is_some() {
            return Err(ForwardError::Sink("response body already written".to_string()));
        }
        self.status.get_or_insert(StatusCode::OK);

        let stream = body.into_data_stream().inspect_err(|error| {
            tracing::warn!(error = %error, "Response body stream failed after status was committed");
        });
        self.body = Some(Body::from_stream(stream));
        Ok(())
    }
}

/// A sink whose status was never committed yields `200 OK`.
impl IntoResponse for ResponseBuilderSink {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body.unwrap_or_default());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn test_status_committed_once() {
        let mut sink = ResponseBuilderSink::new();
        assert!(!sink.is_committed());

        sink.write_status(StatusCode::CREATED);
        sink.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sink.is_committed());
        assert_eq!(sink.status(), Some(StatusCode::CREATED));
    }

    #[tokio::test]
    async fn test_builds_response() {
        let mut sink = ResponseBuilderSink::new();
        sink.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        sink.write_status(StatusCode::ACCEPTED);
        sink.write_body(Body::from("done")).await.unwrap();

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"done");
    }

    #[tokio::test]
    async fn test_second_body_write_fails() {
        let mut sink = ResponseBuilderSink::new();
        sink.write_body(Body::empty()).await.unwrap();
        let err = sink.write_body(Body::empty()).await.unwrap_err();
        assert!(matches!(err, ForwardError::Sink(_)));
    }
}
