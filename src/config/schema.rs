//! Configuration schema definitions.
//!
//! This module defines the configuration a host hands to the forwarder.
//! All types derive Serde traits so the host can embed them in its own
//! config files; every field has a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default multipart upload limit (32 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 32 << 20;

/// Default limit for url-encoded form bodies (10 MiB).
pub const DEFAULT_MAX_FORM_SIZE: u64 = 10 << 20;

/// Root configuration for the forwarding layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream API the requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Body size limits applied while encoding inbound requests.
    pub limits: LimitsConfig,

    /// Response rendering settings.
    pub response: ResponseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL relative paths are appended to (e.g., "https://api.example.com/v1").
    pub base_url: String,

    /// Default timeout for the outbound leg in seconds.
    pub timeout_secs: u64,

    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
            pool_idle_timeout_secs: 90,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request body limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum total size of a multipart body in bytes.
    pub max_upload_size: u64,

    /// Maximum size of a url-encoded form body in bytes.
    pub max_form_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            max_form_size: DEFAULT_MAX_FORM_SIZE,
        }
    }
}

/// Response rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResponseConfig {
    /// Upstream response headers copied to the client (allow-list).
    pub transfer_headers: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
