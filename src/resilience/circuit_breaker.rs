//! Circuit breaker implementation.
//!
//! One breaker guards one logical upstream dependency and is shared by every
//! call routed to it. Closed passes calls through and counts consecutive
//! failures; reaching the threshold opens the circuit until
//! `next_attempt_time`. The first call after that instant becomes the single
//! half-open probe: its success closes the circuit, its failure reopens it.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use crate::errors::{AegisError, AegisResult};

/// Failure threshold of a breaker built with [`CircuitBreakerConfig::default`].
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Open interval of a breaker built with [`CircuitBreakerConfig::default`].
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure threshold for the upstream catalog dependency.
///
/// Lower than [`DEFAULT_FAILURE_THRESHOLD`]: the catalog sits behind the
/// service's own retries, so three consecutive failures already reflect
/// several failed upstream requests.
pub const UPSTREAM_FAILURE_THRESHOLD: u32 = 3;

/// Open interval for the upstream catalog dependency.
pub const UPSTREAM_RESET_TIMEOUT: Duration = Duration::from_secs(30);

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are rejected until the reset timeout elapses.
    Open,
    /// One probe call is in flight.
    HalfOpen,
}

impl CircuitState {
    /// Returns the state name.
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a probe.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

impl CircuitBreakerConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for the upstream catalog dependency.
    pub fn upstream() -> Self {
        Self {
            failure_threshold: UPSTREAM_FAILURE_THRESHOLD,
            reset_timeout: UPSTREAM_RESET_TIMEOUT,
        }
    }

    /// Sets the failure threshold.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the reset timeout.
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> AegisResult<()> {
        if self.failure_threshold == 0 {
            return Err(AegisError::configuration(
                "failure_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Read-only view of a breaker for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerSnapshot {
    /// Current state.
    pub state: CircuitState,
    /// Consecutive failures recorded.
    pub failure_count: u32,
    /// Configured threshold.
    pub failure_threshold: u32,
    /// Configured reset timeout.
    pub reset_timeout: Duration,
    /// When a probe will be admitted. Set only while open, and left unset
    /// when the deadline lies beyond what `Instant` can represent.
    pub next_attempt_time: Option<Instant>,
    /// Time left until a probe is admitted, zero once it has passed. Set
    /// only while open.
    pub retry_after: Option<Duration>,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// How a call was let through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Normal,
    Probe,
}

/// Circuit breaker for protecting against cascading failures.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            clock: Arc::new(SystemClock),
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Name of the guarded dependency.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Returns the current state.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Returns a diagnostic snapshot.
    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let now = self.clock.now();
        let inner = self.lock();
        CircuitBreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            failure_threshold: self.config.failure_threshold,
            reset_timeout: self.config.reset_timeout,
            next_attempt_time: inner
                .opened_at
                .and_then(|at| at.checked_add(self.config.reset_timeout)),
            retry_after: inner.opened_at.map(|at| self.remaining(at, now)),
        }
    }

    /// Runs `operation` through the breaker.
    ///
    /// Fails fast with [`AegisError::CircuitOpen`], without invoking
    /// `operation`, while the circuit is open and the reset timeout has not
    /// elapsed, or while another call is probing.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> AegisResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AegisResult<T>>,
    {
        let admission = self.acquire()?;
        let mut guard = ProbeGuard {
            breaker: self,
            armed: admission == Admission::Probe,
        };

        let result = operation().await;
        guard.armed = false;

        match &result {
            Ok(_) => self.record_success(admission),
            Err(err) => self.record_failure(admission, err),
        }

        result
    }

    /// Forces the breaker back to closed.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        tracing::info!(breaker = %self.name, "Circuit breaker reset");
    }

    // Elapsed-based: never adds `reset_timeout` to an `Instant`.
    fn remaining(&self, opened_at: Instant, now: Instant) -> Duration {
        self.config
            .reset_timeout
            .saturating_sub(now.saturating_duration_since(opened_at))
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // Critical sections never panic midway, so a poisoned state is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> AegisResult<Admission> {
        let now = self.clock.now();
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => Ok(Admission::Normal),
            CircuitState::Open => match inner.opened_at.map(|at| self.remaining(at, now)) {
                Some(left) if !left.is_zero() => Err(AegisError::CircuitOpen {
                    retry_after: Some(left),
                }),
                _ => {
                    tracing::info!(breaker = %self.name, "Circuit breaker half-open, probing");
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    Ok(Admission::Probe)
                }
            },
            CircuitState::HalfOpen if inner.probe_in_flight => {
                Err(AegisError::CircuitOpen { retry_after: None })
            }
            CircuitState::HalfOpen => {
                inner.probe_in_flight = true;
                Ok(Admission::Probe)
            }
        }
    }

    fn record_success(&self, admission: Admission) {
        let mut inner = self.lock();

        match (admission, inner.state) {
            (Admission::Probe, _) => {
                tracing::info!(breaker = %self.name, "Circuit breaker closing after successful probe");
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
                inner.opened_at = None;
                inner.probe_in_flight = false;
            }
            (Admission::Normal, CircuitState::Closed) => {
                inner.failure_count = 0;
            }
            // Admitted before the circuit opened; the trip stands.
            (Admission::Normal, _) => {}
        }
    }

    fn record_failure(&self, admission: Admission, err: &AegisError) {
        let now = self.clock.now();
        let mut inner = self.lock();

        match (admission, inner.state) {
            (Admission::Probe, _) => {
                tracing::warn!(
                    breaker = %self.name,
                    error = %err,
                    "Circuit breaker re-opening after failed probe"
                );
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                inner.probe_in_flight = false;
            }
            (Admission::Normal, CircuitState::Closed) => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    tracing::warn!(
                        breaker = %self.name,
                        failures = inner.failure_count,
                        threshold = self.config.failure_threshold,
                        error = %err,
                        "Circuit breaker opening"
                    );
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                }
            }
            (Admission::Normal, _) => {}
        }
    }

    fn abandon_probe(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.probe_in_flight = false;
        }
    }
}

/// Frees the probe slot if a probe call is dropped before completing.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.abandon_probe();
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
