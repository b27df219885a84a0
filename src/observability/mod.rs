//! Observability module for the Aegis client.
//!
//! The request pipeline reports every remote call to a set of
//! [`RequestObserver`]s. [`TracingObserver`] turns those events into
//! structured `tracing` events; [`MetricsObserver`] keeps counters.

mod logging;
mod metrics;

pub use logging::{env_filter, init_tracing, LogFormat, DEFAULT_LOG_FILTER};
pub use metrics::{EndpointMetrics, MetricsObserver, MetricsSnapshot};

use std::time::Duration;
use uuid::Uuid;

use crate::config::Endpoint;
use crate::errors::AegisError;
use crate::transport::HttpMethod;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identity of one pipeline call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Correlation id, also sent as [`REQUEST_ID_HEADER`].
    pub request_id: String,
    /// Logical operation.
    pub endpoint: Endpoint,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path relative to the API base.
    pub path: String,
}

impl RequestInfo {
    /// Creates request info with a fresh correlation id.
    pub fn new(endpoint: Endpoint, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            endpoint,
            method,
            path: path.into(),
        }
    }
}

/// Hooks invoked around each transport call.
///
/// Called once per attempt; a retried operation produces several
/// request/outcome pairs.
pub trait RequestObserver: Send + Sync {
    /// Called before the transport is invoked.
    fn on_request(&self, _info: &RequestInfo) {}

    /// Called when a 2xx response arrived.
    fn on_response(&self, _info: &RequestInfo, _status: u16, _elapsed: Duration) {}

    /// Called with the classified error when the call failed.
    fn on_error(&self, _info: &RequestInfo, _error: &AegisError, _elapsed: Duration) {}
}

/// Emits a `tracing` event for every request and outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, info: &RequestInfo) {
        tracing::debug!(
            request_id = %info.request_id,
            endpoint = %info.endpoint,
            method = %info.method,
            path = %info.path,
            "Sending request"
        );
    }

    fn on_response(&self, info: &RequestInfo, status: u16, elapsed: Duration) {
        tracing::debug!(
            request_id = %info.request_id,
            endpoint = %info.endpoint,
            method = %info.method,
            path = %info.path,
            status,
            elapsed_ms = elapsed_ms(elapsed),
            "Request succeeded"
        );
    }

    fn on_error(&self, info: &RequestInfo, error: &AegisError, elapsed: Duration) {
        tracing::warn!(
            request_id = %info.request_id,
            endpoint = %info.endpoint,
            method = %info.method,
            path = %info.path,
            status = error.status(),
            error_kind = %error.kind(),
            error = %error,
            elapsed_ms = elapsed_ms(elapsed),
            "Request failed"
        );
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
