//! Metrics collection for the Aegis client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use super::{RequestInfo, RequestObserver};
use crate::config::Endpoint;
use crate::errors::{AegisError, ErrorKind};

/// Per-endpoint counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointMetrics {
    /// Requests sent.
    pub requests: u64,
    /// Requests answered with a 2xx status.
    pub successes: u64,
    /// Requests that ended in a classified error.
    pub failures: u64,
}

/// Metrics snapshot.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Total requests.
    pub total_requests: u64,
    /// Successful requests.
    pub successful_requests: u64,
    /// Failed requests.
    pub failed_requests: u64,
    /// Total latency in milliseconds over completed requests.
    pub total_latency_ms: u64,
    /// Counters per endpoint.
    pub endpoints: HashMap<Endpoint, EndpointMetrics>,
    /// Failure counts by error kind.
    pub errors: HashMap<ErrorKind, u64>,
}

impl MetricsSnapshot {
    /// Calculates average latency in milliseconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_latency_ms(&self) -> f64 {
        let completed = self.successful_requests + self.failed_requests;
        if completed == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / completed as f64
        }
    }

    /// Calculates success rate as a percentage.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let completed = self.successful_requests + self.failed_requests;
        if completed == 0 {
            100.0
        } else {
            (self.successful_requests as f64 / completed as f64) * 100.0
        }
    }

    /// Returns the counters for `endpoint`, zero if it was never called.
    pub fn endpoint(&self, endpoint: Endpoint) -> EndpointMetrics {
        self.endpoints.get(&endpoint).copied().unwrap_or_default()
    }

    /// Returns the failure count for `kind`.
    pub fn errors_of(&self, kind: ErrorKind) -> u64 {
        self.errors.get(&kind).copied().unwrap_or(0)
    }
}

/// Observer that counts requests, outcomes and error kinds.
///
/// Every pipeline call is counted, so a call retried three times shows up as
/// three requests.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_latency_ms: AtomicU64,
    endpoints: RwLock<HashMap<Endpoint, EndpointMetrics>>,
    errors: RwLock<HashMap<ErrorKind, u64>>,
}

impl MetricsObserver {
    /// Creates a new metrics observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            total_latency_ms: self.total_latency_ms.load(Ordering::Relaxed),
            endpoints: self
                .endpoints
                .read()
                .map(|e| e.clone())
                .unwrap_or_default(),
            errors: self.errors.read().map(|e| e.clone()).unwrap_or_default(),
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        self.total_latency_ms.store(0, Ordering::Relaxed);
        if let Ok(mut endpoints) = self.endpoints.write() {
            endpoints.clear();
        }
        if let Ok(mut errors) = self.errors.write() {
            errors.clear();
        }
    }

    fn update_endpoint(&self, endpoint: Endpoint, update: impl FnOnce(&mut EndpointMetrics)) {
        if let Ok(mut endpoints) = self.endpoints.write() {
            update(endpoints.entry(endpoint).or_default());
        }
    }

    fn add_latency(&self, elapsed: Duration) {
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.total_latency_ms.fetch_add(ms, Ordering::Relaxed);
    }
}

impl RequestObserver for MetricsObserver {
    fn on_request(&self, info: &RequestInfo) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.update_endpoint(info.endpoint, |m| m.requests += 1);
    }

    fn on_response(&self, info: &RequestInfo, _status: u16, elapsed: Duration) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.add_latency(elapsed);
        self.update_endpoint(info.endpoint, |m| m.successes += 1);
    }

    fn on_error(&self, info: &RequestInfo, error: &AegisError, elapsed: Duration) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        self.add_latency(elapsed);
        self.update_endpoint(info.endpoint, |m| m.failures += 1);
        if let Ok(mut errors) = self.errors.write() {
            *errors.entry(error.kind()).or_insert(0) += 1;
        }
    }
}
