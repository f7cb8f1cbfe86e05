//! Per-call forwarding options.
//!
//! `ForwardOptions` is built fresh for every call. Each `with_*` call
//! overwrites what an earlier call set, so the last writer wins. Fields left
//! unset fall back to the forwarder's [`ForwardDefaults`].

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use serde_json::Value;
use url::Url;

use crate::config::schema::{ProxyConfig, DEFAULT_MAX_FORM_SIZE, DEFAULT_MAX_UPLOAD_SIZE};
use crate::encoder::form::FormValues;
use crate::encoder::multipart_writer::MultipartWriter;
use crate::proxy::interceptor::Interceptors;

/// Forwarder-wide defaults, usually derived from [`ProxyConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDefaults {
    pub request_timeout: Duration,
    pub max_upload_size: u64,
    pub max_form_size: u64,
    pub transfer_response_headers: Vec<HeaderName>,
}

impl Default for ForwardDefaults {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            max_form_size: DEFAULT_MAX_FORM_SIZE,
            transfer_response_headers: Vec::new(),
        }
    }
}

impl From<&ProxyConfig> for ForwardDefaults {
    /// Header names that fail to parse are skipped; `validate_config` reports them.
    fn from(config: &ProxyConfig) -> Self {
        Self {
            request_timeout: config.upstream.timeout(),
            max_upload_size: config.limits.max_upload_size,
            max_form_size: config.limits.max_form_size,
            transfer_response_headers: config
                .response
                .transfer_headers
                .iter()
                .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
                .collect(),
        }
    }
}

/// Options for a single forwarding call.
#[derive(Debug, Clone, Default)]
pub struct ForwardOptions {
    request_timeout: Option<Duration>,
    max_upload_size: Option<u64>,
    max_form_size: Option<u64>,
    transfer_response_headers: Option<Vec<HeaderName>>,
    interceptors: Interceptors,
}

impl ForwardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Byte limit for multipart parsing.
    pub fn with_max_upload_size(mut self, limit: u64) -> Self {
        self.max_upload_size = Some(limit);
        self
    }

    /// Byte limit for url-encoded form parsing.
    pub fn with_max_form_size(mut self, limit: u64) -> Self {
        self.max_form_size = Some(limit);
        self
    }

    /// Replace the allow-list of upstream response headers copied to the client.
    pub fn with_transfer_response_headers<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.transfer_response_headers = Some(names.into_iter().collect());
        self
    }

    pub fn with_url_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Url) + Send + Sync + 'static,
    {
        self.interceptors.url = Some(Arc::new(f));
        self
    }

    pub fn with_request_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Request<Body>) + Send + Sync + 'static,
    {
        self.interceptors.request = Some(Arc::new(f));
        self
    }

    pub fn with_request_json_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.interceptors.request_json = Some(Arc::new(f));
        self
    }

    pub fn with_request_form_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(FormValues) -> FormValues + Send + Sync + 'static,
    {
        self.interceptors.request_form = Some(Arc::new(f));
        self
    }

    pub fn with_request_multipart_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut MultipartWriter) -> io::Result<()> + Send + Sync + 'static,
    {
        self.interceptors.request_multipart = Some(Arc::new(f));
        self
    }

    pub fn with_response_json_interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.interceptors.response_json = Some(Arc::new(f));
        self
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Fill unset fields from `defaults`.
    pub fn resolve(self, defaults: &ForwardDefaults) -> EffectiveOptions {
        EffectiveOptions {
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_upload_size: self.max_upload_size.unwrap_or(defaults.max_upload_size),
            max_form_size: self.max_form_size.unwrap_or(defaults.max_form_size),
            transfer_response_headers: self
                .transfer_response_headers
                .unwrap_or_else(|| defaults.transfer_response_headers.clone()),
            interceptors: self.interceptors,
        }
    }
}

/// Fully resolved options used by the encoders and the renderer.
#[derive(Debug, Clone)]
pub struct EffectiveOptions {
    pub request_timeout: Duration,
    pub max_upload_size: u64,
    pub max_form_size: u64,
    pub transfer_response_headers: Vec<HeaderName>,
    pub interceptors: Interceptors,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        ForwardOptions::default().resolve(&ForwardDefaults::default())
    }
}
