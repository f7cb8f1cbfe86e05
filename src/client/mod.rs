//! Upstream client subsystem.
//!
//! The forwarder never talks to the network itself. It hands a prepared
//! [`ApiRequest`] to an [`UpstreamClient`] and gets back the upstream
//! response.
//!
//! # Data Flow
//! ```text
//! ApiRequest (method, path, seeded headers, body, hooks, timeout)
//!     → resolve_url (absolute path verbatim, otherwise base + path)
//!     → URL interceptors, fragment dropped
//!     → Request<Body>, request interceptors
//!     → hyper_client.rs (pooled hyper-util client)
//!       or service.rs (any tower Service, e.g. an axum Router)
//!     → Response<Body>
//! ```
//!
//! # Design Decisions
//! - No retries; the first transport error is returned unchanged
//! - The timeout covers the send up to the response head

pub mod hyper_client;
pub mod service;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Response, Uri};
use url::Url;

use crate::error::{ForwardError, ForwardResult};
use crate::proxy::interceptor::{RequestInterceptor, UrlInterceptor};

pub use hyper_client::HyperClient;
pub use service::ServiceClient;

/// Collaborator that performs the actual network call.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ForwardResult<Response<Body>>;
}

/// Outbound request as prepared by the forwarder.
pub struct ApiRequest {
    pub method: Method,
    /// Relative (`/v1/orders?x=1`) or absolute-form (`http://host/path`) target.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Body,
    pub url_interceptors: Vec<UrlInterceptor>,
    pub request_interceptors: Vec<RequestInterceptor>,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Body::empty(),
            url_interceptors: Vec::new(),
            request_interceptors: Vec::new(),
            timeout,
        }
    }

    /// Build the `http` request sent on the wire, running the attached hooks.
    pub fn into_http_request(self, base: &Url) -> ForwardResult<Request<Body>> {
        let mut url = resolve_url(base, &self.path)?;
        for intercept in &self.url_interceptors {
            intercept(&mut url);
        }
        url.set_fragment(None);

        let uri: Uri = url.as_str().parse().map_err(|e: axum::http::uri::InvalidUri| {
            ForwardError::InvalidTarget {
                target: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut request = Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;

        for intercept in &self.request_interceptors {
            intercept(&mut request);
        }
        Ok(request)
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("url_interceptors", &self.url_interceptors.len())
            .field("request_interceptors", &self.request_interceptors.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Resolve `path` against `base`. Absolute http(s) targets are used verbatim,
/// anything else is appended to the base URL.
pub fn resolve_url(base: &Url, path: &str) -> ForwardResult<Url> {
    let invalid = |reason: String| ForwardError::InvalidTarget {
        target: path.to_string(),
        reason,
    };

    if is_absolute(path) {
        return Url::parse(path).map_err(|e| invalid(e.to_string()));
    }

    let mut joined = base.as_str().trim_end_matches('/').to_string();
    if !path.is_empty() && !path.starts_with(['/', '?', '#']) {
        joined.push('/');
    }
    joined.push_str(path);
    Url::parse(&joined).map_err(|e| invalid(e.to_string()))
}

fn is_absolute(path: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        path.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{header, HeaderValue};

    fn base() -> Url {
        Url::parse("https://api.example.com/v1").unwrap()
    }

    #[test]
    fn test_resolve_relative_paths() {
        assert_eq!(
            resolve_url(&base(), "/orders?status=open").unwrap().as_str(),
            "https://api.example.com/v1/orders?status=open"
        );
        assert_eq!(
            resolve_url(&base(), "orders").unwrap().as_str(),
            "https://api.example.com/v1/orders"
        );
        assert_eq!(resolve_url(&base(), "").unwrap().as_str(), "https://api.example.com/v1");
    }

    #[test]
    fn test_resolve_absolute_paths() {
        assert_eq!(
            resolve_url(&base(), "HTTP://other.local:9000/x").unwrap().as_str(),
            "http://other.local:9000/x"
        );
    }

    #[test]
    fn test_invalid_absolute_target() {
        let err = resolve_url(&base(), "http://").unwrap_err();
        assert!(matches!(err, ForwardError::InvalidTarget { .. }));
    }

    #[test]
    fn test_hooks_and_fragment() {
        let mut request = ApiRequest::new(Method::PATCH, "/items/1?x=1#frag", Duration::from_secs(1));
        request.headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        request.url_interceptors.push(Arc::new(|url: &mut Url| {
            url.query_pairs_mut().append_pair("api_key", "k");
        }));
        request.url_interceptors.push(Arc::new(|url: &mut Url| {
            url.set_path(&url.path().replace("/items", "/things"));
        }));
        request.request_interceptors.push(Arc::new(|req: &mut Request<Body>| {
            req.headers_mut()
                .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        }));

        let http = request.into_http_request(&base()).unwrap();
        assert_eq!(http.method(), Method::PATCH);
        assert_eq!(http.uri(), "https://api.example.com/v1/things/1?x=1&api_key=k");
        assert_eq!(http.headers()[header::ACCEPT], "application/json");
        assert_eq!(http.headers()[header::AUTHORIZATION], "Bearer t");
    }
}
