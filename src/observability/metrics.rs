//! Metrics collection.
//!
//! # Metrics
//! - `proxy_forward_requests_total` (counter): completed forwards by request type, status
//! - `proxy_forward_errors_total` (counter): failed forwards by error kind
//! - `proxy_forward_duration_seconds` (histogram): end-to-end latency of a forward
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; exporting is the host's concern
//! - Labels are low-cardinality (request type, status code, error kind)

use std::time::Instant;

use crate::error::ForwardError;
use crate::proxy::ProxyRequestType;

/// Record a forward that reached the upstream and rendered a response.
pub fn record_forward(request_type: ProxyRequestType, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_forward_requests_total",
        "request_type" => request_type.metric_label(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "proxy_forward_duration_seconds",
        "request_type" => request_type.metric_label()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a forward that failed.
pub fn record_error(request_type: ProxyRequestType, error: &ForwardError) {
    metrics::counter!(
        "proxy_forward_errors_total",
        "request_type" => request_type.metric_label(),
        "kind" => error.kind()
    )
    .increment(1);
}
