//! Upstream client over a tower `Service`.
//!
//! Lets the forwarder target an in-process upstream such as an axum
//! `Router` without opening sockets.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use tower::{Service, ServiceExt};
use url::Url;

use crate::client::{ApiRequest, UpstreamClient};
use crate::error::{BoxError, ForwardError, ForwardResult};
use crate::resilience::timeouts::with_timeout;

#[derive(Debug, Clone)]
pub struct ServiceClient<S> {
    service: S,
    base_url: Url,
}

impl<S> ServiceClient<S> {
    /// `base_url` is only used to resolve relative targets.
    pub fn new(service: S, base_url: Url) -> Self {
        Self { service, base_url }
    }
}

#[async_trait]
impl<S> UpstreamClient for ServiceClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    async fn send(&self, request: ApiRequest) -> ForwardResult<Response<Body>> {
        let timeout = request.timeout;
        let request = request.into_http_request(&self.base_url)?;
        let service = self.service.clone();

        with_timeout(timeout, async move {
            service
                .oneshot(request)
                .await
                .map_err(|e| ForwardError::Transport(e.into()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::{Method, StatusCode};
    use axum::routing::get;
    use axum::Router;

    #[tokio::test]
    async fn test_routes_to_service() {
        let router = Router::new().route("/v1/ping", get(|| async { "pong" }));
        let client = ServiceClient::new(router, Url::parse("http://upstream.local/v1").unwrap());

        let response = client
            .send(ApiRequest::new(Method::GET, "/ping", Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"pong");
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let client = ServiceClient::new(router, Url::parse("http://upstream.local").unwrap());

        let err = client
            .send(ApiRequest::new(Method::GET, "/slow", Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::Timeout(_)));
    }
}
