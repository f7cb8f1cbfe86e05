//! Forwarding orchestrator.
//!
//! One call to [`Forwarder::forward`]:
//!
//! ```text
//! resolve method/path → resolve options → encode body
//!     → seed headers → UpstreamClient::send → render into sink
//! ```
//!
//! Any encoder failure aborts before anything is sent. The upstream
//! response body is owned by the renderer and released on every exit path.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::client::{ApiRequest, HyperClient, UpstreamClient};
use crate::config::ProxyConfig;
use crate::encoder;
use crate::error::ForwardResult;
use crate::http::request::{inbound_target, seed_headers};
use crate::http::response::render;
use crate::http::sink::{ResponseBuilderSink, ResponseSink};
use crate::observability::metrics;
use crate::proxy::options::{ForwardDefaults, ForwardOptions};
use crate::proxy::ProxyRequestType;

/// Forwards inbound requests to an upstream through `C`.
#[derive(Debug, Clone)]
pub struct Forwarder<C> {
    client: C,
    defaults: ForwardDefaults,
}

impl Forwarder<HyperClient> {
    /// Forwarder over a pooled hyper client, with defaults taken from `config`.
    pub fn from_config(config: &ProxyConfig) -> ForwardResult<Self> {
        let client = HyperClient::from_config(&config.upstream)?;
        Ok(Self::new(client, ForwardDefaults::from(config)))
    }
}

impl<C: UpstreamClient> Forwarder<C> {
    pub fn new(client: C, defaults: ForwardDefaults) -> Self {
        Self { client, defaults }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn defaults(&self) -> &ForwardDefaults {
        &self.defaults
    }

    /// Forward `request` upstream and write the upstream response into `sink`.
    ///
    /// `method` and `path` default to the inbound request's when `None` (or,
    /// for `path`, empty). Errors returned after `sink` committed its status
    /// can no longer change what the client sees.
    pub async fn forward<S>(
        &self,
        method: Option<Method>,
        path: Option<&str>,
        request: Request<Body>,
        sink: &mut S,
        request_type: ProxyRequestType,
        options: ForwardOptions,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        let start = Instant::now();
        match self
            .forward_inner(method, path, request, sink, request_type, options)
            .await
        {
            Ok(status) => {
                metrics::record_forward(request_type, status.as_u16(), start);
                Ok(())
            }
            Err(err) => {
                metrics::record_error(request_type, &err);
                Err(err)
            }
        }
    }

    async fn forward_inner<S>(
        &self,
        method: Option<Method>,
        path: Option<&str>,
        request: Request<Body>,
        sink: &mut S,
        request_type: ProxyRequestType,
        options: ForwardOptions,
    ) -> ForwardResult<StatusCode>
    where
        S: ResponseSink + ?Sized,
    {
        let options = options.resolve(&self.defaults);
        let (parts, body) = request.into_parts();

        let method = method.unwrap_or_else(|| parts.method.clone());
        let path = match path {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => inbound_target(&parts.uri),
        };

        tracing::debug!(
            method = %method,
            path = %path,
            request_type = %request_type,
            "Forwarding request"
        );

        let encoded = encoder::encode(request_type, &parts.method, &parts.headers, body, &options).await?;

        let mut outbound = ApiRequest::new(method, path, options.request_timeout);
        outbound.headers = seed_headers(&parts.headers, encoded.content_type);
        outbound.body = encoded.body;
        outbound.url_interceptors.extend(options.interceptors.url.clone());
        outbound.request_interceptors.extend(options.interceptors.request.clone());

        let response = self.client.send(outbound).await?;
        let status = response.status();
        tracing::debug!(status = %status, "Upstream responded");

        render(response, sink, &options).await?;
        Ok(status)
    }

    /// Forward with the Raw encoder (passthrough, or JSON rewrite).
    pub async fn forward_json<S>(
        &self,
        method: Method,
        path: &str,
        request: Request<Body>,
        sink: &mut S,
        options: ForwardOptions,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        self.forward(Some(method), Some(path), request, sink, ProxyRequestType::Raw, options)
            .await
    }

    /// Raw forward keeping the inbound method and target.
    pub async fn transparent_forward_json<S>(
        &self,
        request: Request<Body>,
        sink: &mut S,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        self.forward(None, None, request, sink, ProxyRequestType::Raw, ForwardOptions::default())
            .await
    }

    pub async fn forward_form<S>(
        &self,
        method: Method,
        path: &str,
        request: Request<Body>,
        sink: &mut S,
        options: ForwardOptions,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        self.forward(Some(method), Some(path), request, sink, ProxyRequestType::Form, options)
            .await
    }

    pub async fn transparent_forward_form<S>(
        &self,
        request: Request<Body>,
        sink: &mut S,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        self.forward(None, None, request, sink, ProxyRequestType::Form, ForwardOptions::default())
            .await
    }

    pub async fn forward_multipart<S>(
        &self,
        method: Method,
        path: &str,
        request: Request<Body>,
        sink: &mut S,
        options: ForwardOptions,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        self.forward(
            Some(method),
            Some(path),
            request,
            sink,
            ProxyRequestType::MultipartForm,
            options,
        )
        .await
    }

    pub async fn transparent_forward_multipart<S>(
        &self,
        request: Request<Body>,
        sink: &mut S,
    ) -> ForwardResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        self.forward(
            None,
            None,
            request,
            sink,
            ProxyRequestType::MultipartForm,
            ForwardOptions::default(),
        )
        .await
    }

    /// Forward into a fresh [`ResponseBuilderSink`] and return an axum response.
    ///
    /// An error before the status was committed becomes its mapped status
    /// (see [`crate::ForwardError::status_code`]). After commit the client
    /// keeps the upstream status and whatever body was written; the error is
    /// only logged.
    pub async fn forward_response(
        &self,
        method: Option<Method>,
        path: Option<&str>,
        request: Request<Body>,
        request_type: ProxyRequestType,
        options: ForwardOptions,
    ) -> Response {
        let mut sink = ResponseBuilderSink::new();
        match self
            .forward(method, path, request, &mut sink, request_type, options)
            .await
        {
            Ok(()) => sink.into_response(),
            Err(err) if !sink.is_committed() => {
                tracing::debug!(error = %err, "Forward failed before response was committed");
                err.into_response()
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    status = ?sink.status(),
                    "Forward failed after response was committed"
                );
                sink.into_response()
            }
        }
    }
}
