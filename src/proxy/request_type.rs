//! Request type selection.

use std::fmt;

/// Selects which request encoder runs for a forwarding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProxyRequestType {
    /// No body transform; the outbound request carries an empty body.
    #[default]
    None,
    /// Raw passthrough, or JSON rewrite when a request JSON interceptor is set.
    Raw,
    /// URL-encoded form re-encoding.
    Form,
    /// Multipart form re-encoding.
    MultipartForm,
}

impl ProxyRequestType {
    /// Wire label used by hosts that select the type from a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyRequestType::None => "",
            ProxyRequestType::Raw => "RAW",
            ProxyRequestType::Form => "FORM",
            ProxyRequestType::MultipartForm => "MULTIPART_FORM",
        }
    }

    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            ProxyRequestType::None => "none",
            ProxyRequestType::Raw => "raw",
            ProxyRequestType::Form => "form",
            ProxyRequestType::MultipartForm => "multipart_form",
        }
    }
}

/// Exact, case-sensitive match; anything unrecognized is `None`.
impl From<&str> for ProxyRequestType {
    fn from(label: &str) -> Self {
        match label {
            "RAW" => ProxyRequestType::Raw,
            "FORM" => ProxyRequestType::Form,
            "MULTIPART_FORM" => ProxyRequestType::MultipartForm,
            _ => ProxyRequestType::None,
        }
    }
}

impl fmt::Display for ProxyRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric_label())
    }
}
