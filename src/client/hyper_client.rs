//! Pooled hyper client rooted at a base URL.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use url::Url;

use crate::client::{ApiRequest, UpstreamClient};
use crate::config::schema::UpstreamConfig;
use crate::error::{ForwardError, ForwardResult};
use crate::resilience::timeouts::with_timeout;

const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Plain-HTTP upstream client backed by hyper-util's connection pool.
#[derive(Debug, Clone)]
pub struct HyperClient {
    client: Client<HttpConnector, Body>,
    base_url: Url,
}

impl HyperClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_pool_idle_timeout(base_url, DEFAULT_POOL_IDLE_TIMEOUT)
    }

    pub fn with_pool_idle_timeout(base_url: Url, idle: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(idle)
            .pool_timer(TokioTimer::new())
            .build(HttpConnector::new());
        Self { client, base_url }
    }

    pub fn from_config(config: &UpstreamConfig) -> ForwardResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ForwardError::InvalidTarget {
            target: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::with_pool_idle_timeout(
            base_url,
            Duration::from_secs(config.pool_idle_timeout_secs),
        ))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl UpstreamClient for HyperClient {
    async fn send(&self, request: ApiRequest) -> ForwardResult<Response<Body>> {
        let timeout = request.timeout;
        let request = request.into_http_request(&self.base_url)?;

        tracing::debug!(method = %request.method(), uri = %request.uri(), "Sending upstream request");

        let response: Response<Incoming> = with_timeout(timeout, async {
            self.client
                .request(request)
                .await
                .map_err(|e| ForwardError::Transport(Box::new(e)))
        })
        .await?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
