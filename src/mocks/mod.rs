//! Mock implementations for testing.
//!
//! Provides a scripted transport and deterministic time and randomness
//! sources so retry and circuit breaker behavior can be tested without a
//! network or real sleeps.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::resilience::{Clock, JitterSource, Sleeper};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self::raw(200, serde_json::to_vec(value).unwrap_or_default())
            .with_header("content-type", "application/json")
    }

    /// Creates an error response in the service's structured error shape.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({
            "error": true,
            "status_code": status,
            "message": message,
        });
        Self::raw(status, serde_json::to_vec(&body).unwrap_or_default())
            .with_header("content-type", "application/json")
    }

    /// Creates an error response in the framework `{"detail": ...}` shape.
    pub fn detail(status: u16, detail: serde_json::Value) -> Self {
        let body = serde_json::json!({ "detail": detail });
        Self::raw(status, serde_json::to_vec(&body).unwrap_or_default())
            .with_header("content-type", "application/json")
    }

    /// Creates a response with an arbitrary body.
    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    fn into_response(self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers,
            body: self.body.into(),
        }
    }
}

type Scripted = Result<MockResponse, TransportError>;

/// Mock HTTP transport for testing.
///
/// Scripted outcomes are consumed in order; once the queue is empty the
/// default outcome is returned, or a 500 if none was set.
#[derive(Default)]
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Scripted>>,
    default_outcome: Mutex<Option<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.outcomes).push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues an error response.
    pub fn queue_error(&self, status: u16, message: &str) {
        self.queue(MockResponse::error(status, message));
    }

    /// Queues a transport failure.
    pub fn queue_failure(&self, error: TransportError) {
        lock(&self.outcomes).push_back(Err(error));
    }

    /// Sets the response returned once the queue is drained.
    pub fn set_default(&self, response: MockResponse) {
        *lock(&self.default_outcome) = Some(Ok(response));
    }

    /// Sets the failure returned once the queue is drained.
    pub fn set_default_failure(&self, error: TransportError) {
        *lock(&self.default_outcome) = Some(Err(error));
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_outcome(&self) -> Scripted {
        if let Some(outcome) = lock(&self.outcomes).pop_front() {
            return outcome;
        }
        lock(&self.default_outcome)
            .clone()
            .unwrap_or_else(|| Ok(MockResponse::error(500, "No mock response configured")))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);
        self.next_outcome().map(MockResponse::into_response)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish_non_exhaustive()
    }
}

/// Sleeper that returns immediately and records each requested duration.
///
/// When linked to a [`ManualClock`], each sleep also advances that clock.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
    clock: Option<Arc<ManualClock>>,
}

impl RecordingSleeper {
    /// Creates a sleeper that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sleeper that also advances `clock`.
    pub fn with_clock(clock: Arc<ManualClock>) -> Self {
        Self {
            sleeps: Mutex::default(),
            clock: Some(clock),
        }
    }

    /// Durations requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }

    /// Sum of requested durations.
    pub fn total(&self) -> Duration {
        lock(&self.sleeps).iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }
}

/// Jitter source that replays a fixed sequence, cycling when exhausted.
#[derive(Debug)]
pub struct SequenceJitter {
    samples: Vec<f64>,
    next: Mutex<usize>,
}

impl SequenceJitter {
    /// Replays `samples` in order. An empty sequence yields zeros.
    pub fn new(samples: Vec<f64>) -> Self {
        Self {
            samples,
            next: Mutex::new(0),
        }
    }

    /// Always yields `sample`.
    pub fn constant(sample: f64) -> Self {
        Self::new(vec![sample])
    }
}

impl JitterSource for SequenceJitter {
    fn sample(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut next = lock(&self.next);
        let sample = self.samples[*next % self.samples.len()];
        *next += 1;
        sample
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        *lock(&self.now) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }
}

/// Test fixtures for common response payloads.
pub mod fixtures {
    use serde_json::{json, Value};

    /// A trajectory with `points` samples on two concentric circles.
    pub fn trajectory(points: usize) -> Value {
        let circle = |radius: f64| -> Vec<[f64; 3]> {
            (0..points)
                .map(|n| {
                    #[allow(clippy::cast_precision_loss)]
                    let angle = std::f64::consts::TAU * n as f64 / points.max(1) as f64;
                    [radius * angle.cos(), radius * angle.sin(), 0.0]
                })
                .collect()
        };
        json!({
            "asteroid_path": circle(1.1),
            "earth_path": circle(1.0),
        })
    }

    /// An abbreviated catalog record for Apophis.
    pub fn apophis() -> Value {
        json!({
            "object": {"fullname": "99942 Apophis (2004 MN4)", "des": "99942", "neo": true, "pha": true},
            "orbit": {
                "epoch": "2461000.5",
                "elements": [
                    {"name": "a", "value": "0.9224", "units": "au"},
                    {"name": "e", "value": "0.1914"},
                    {"name": "i", "value": "3.339", "units": "deg"}
                ]
            },
            "phys_par": [{"name": "diameter", "value": "0.34", "units": "km"}]
        })
    }

    /// An impact result for a 340 m body at 7.42 km/s.
    pub fn impact_result() -> Value {
        json!({
            "craterDiameterMeters": 5142.87,
            "impactEnergyJoules": 7.43e17,
            "massKg": 2.7e10,
            "craterDiameterKm": 5.1429,
            "impactEnergyMegatons": 177.58
        })
    }

    /// A deflection result with a single path point.
    pub fn deflection_result(asteroid_name: &str) -> Value {
        json!({
            "success": true,
            "asteroid_name": asteroid_name,
            "delta_v_applied_mps": 0.05,
            "deflection_time_days": 30.0,
            "original_elements": {"a": 0.9224, "e": 0.1914, "i": 3.339},
            "deflected_elements": {"a": 0.9226, "e": 0.1913, "i": 3.339, "raan": 204.0, "argp": 126.7, "nu": 12.5},
            "deflected_path": [{"x": 0.75, "y": 0.52, "z": 0.01}],
            "path_points": 1
        })
    }

    /// A two-entry catalog listing.
    pub fn asteroids_list() -> Value {
        json!([
            {"name": "Apophis", "designation": "99942", "diameter_km": 0.34, "velocity_kps": 7.42},
            {"name": "Bennu", "designation": "101955", "diameter_km": 0.492, "velocity_kps": 6.14}
        ])
    }

    /// A nearest-approach listing.
    pub fn top10_nearest() -> Value {
        json!({
            "asteroids": [
                {"name": "Apophis", "close_approach_date": "2029-04-13", "miss_distance_km": 38017.0, "relative_velocity_kps": 7.42, "is_hazardous": true}
            ]
        })
    }

    /// A healthy service report.
    pub fn health() -> Value {
        json!({"status": "healthy", "nasa_api_configured": true})
    }
}
