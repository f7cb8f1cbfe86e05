//! Interceptor registry.
//!
//! Typed hook points applied at fixed places in the pipeline:
//!
//! ```text
//! encoder (Raw)       → request_json
//! encoder (Form)      → request_form
//! encoder (Multipart) → request_multipart (before the writer is finalized)
//! client              → url, then request (after header seeding)
//! renderer            → response_json
//! ```
//!
//! Every hook is optional; an unset hook is the identity.

use std::fmt;
use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use url::Url;

use crate::encoder::form::FormValues;
use crate::encoder::multipart_writer::MultipartWriter;

/// Rewrites the resolved upstream URL.
pub type UrlInterceptor = Arc<dyn Fn(&mut Url) + Send + Sync>;

/// Mutates the outbound request before it is sent.
pub type RequestInterceptor = Arc<dyn Fn(&mut Request<Body>) + Send + Sync>;

/// Replaces a decoded JSON value (request or response side).
pub type JsonInterceptor = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Replaces the rebuilt form field set.
pub type FormInterceptor = Arc<dyn Fn(FormValues) -> FormValues + Send + Sync>;

/// Appends fields or files to the outbound multipart body.
pub type MultipartInterceptor = Arc<dyn Fn(&mut MultipartWriter) -> io::Result<()> + Send + Sync>;

/// The set of hooks configured for one forwarding call.
#[derive(Clone, Default)]
pub struct Interceptors {
    pub url: Option<UrlInterceptor>,
    pub request: Option<RequestInterceptor>,
    pub request_json: Option<JsonInterceptor>,
    pub request_form: Option<FormInterceptor>,
    pub request_multipart: Option<MultipartInterceptor>,
    pub response_json: Option<JsonInterceptor>,
}

impl Interceptors {
    pub fn apply_request_json(&self, value: Value) -> Value {
        match &self.request_json {
            Some(f) => f(value),
            None => value,
        }
    }

    pub fn apply_request_form(&self, form: FormValues) -> FormValues {
        match &self.request_form {
            Some(f) => f(form),
            None => form,
        }
    }

    pub fn apply_response_json(&self, value: Value) -> Value {
        match &self.response_json {
            Some(f) => f(value),
            None => value,
        }
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("url", &self.url.is_some())
            .field("request", &self.request.is_some())
            .field("request_json", &self.request_json.is_some())
            .field("request_form", &self.request_form.is_some())
            .field("request_multipart", &self.request_multipart.is_some())
            .field("response_json", &self.response_json.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_hooks_are_identity() {
        let hooks = Interceptors::default();
        assert_eq!(hooks.apply_request_json(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(hooks.apply_response_json(json!([1, 2])), json!([1, 2]));

        let mut form = FormValues::new();
        form.add("k", "v");
        assert_eq!(hooks.apply_request_form(form.clone()), form);
    }

    #[test]
    fn test_json_hook_can_change_shape() {
        let hooks = Interceptors {
            response_json: Some(Arc::new(|v: Value| json!({ "data": v }))),
            ..Default::default()
        };
        assert_eq!(hooks.apply_response_json(json!(3)), json!({"data": 3}));
    }
}
