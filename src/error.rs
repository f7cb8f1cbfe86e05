//! Error taxonomy for a forwarding call.
//!
//! Every error aborts the rest of the call and is handed back to the host
//! as a single value. Whether the host can still turn it into a clean
//! response depends on the sink: once the status line is committed the
//! client has already seen the upstream status (see [`crate::http::ResponseSink`]).

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Boxed error used for transport failures coming from the collaborator client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used throughout the crate.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Errors that can occur while forwarding a request.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Malformed JSON (request or response side) or an invalid gzip stream.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed form or multipart encoding.
    #[error("parse error: {0}")]
    Parse(String),

    /// Multipart body exceeds the configured maximum.
    #[error("request body exceeds upload limit of {limit} bytes")]
    SizeLimit { limit: u64 },

    /// The collaborator client failed to send the request.
    #[error("upstream request failed: {0}")]
    Transport(#[source] BoxError),

    /// The outbound leg did not complete within the request timeout.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// Copy or stream failure on the request or response body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The resolved upstream target could not be turned into a URL.
    #[error("invalid upstream target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// A header produced by an encoder or interceptor is not valid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The response sink refused a write.
    #[error("response sink error: {0}")]
    Sink(String),
}

impl ForwardError {
    /// Status a host should answer with when the error happens before the
    /// response status was committed.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::Decode(_) | ForwardError::Parse(_) => StatusCode::BAD_REQUEST,
            ForwardError::SizeLimit { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::Transport(_) => StatusCode::BAD_GATEWAY,
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Io(_)
            | ForwardError::InvalidTarget { .. }
            | ForwardError::InvalidHeader(_)
            | ForwardError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the inbound request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Short, stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Decode(_) => "decode",
            ForwardError::Parse(_) => "parse",
            ForwardError::SizeLimit { .. } => "size_limit",
            ForwardError::Transport(_) => "transport",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Io(_) => "io",
            ForwardError::InvalidTarget { .. } => "invalid_target",
            ForwardError::InvalidHeader(_) => "invalid_header",
            ForwardError::Sink(_) => "sink",
        }
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        ForwardError::Decode(err.to_string())
    }

    pub(crate) fn io(err: impl Into<BoxError>) -> Self {
        ForwardError::Io(std::io::Error::other(err))
    }
}

impl From<serde_json::Error> for ForwardError {
    fn from(err: serde_json::Error) -> Self {
        ForwardError::decode(err)
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, self.to_string()).into_response()
    }
}
