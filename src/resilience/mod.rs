//! Resilience layer for the Aegis client.
//!
//! Provides the retry executor and the circuit breaker that wrap every
//! remote call, plus the injectable time and randomness seams they use.

mod circuit_breaker;
mod clock;
mod jitter;
mod retry;
mod sleep;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT, UPSTREAM_FAILURE_THRESHOLD,
    UPSTREAM_RESET_TIMEOUT,
};
pub use clock::{Clock, SystemClock};
pub use jitter::{JitterSource, NoJitter, RandomJitter};
pub use retry::{
    apply_jitter, backoff_delay, RetryConfig, RetryExecutor, DEFAULT_BACKOFF_FACTOR,
    DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_RETRYABLE_STATUS_CODES,
    JITTER_RATIO,
};
pub use sleep::{Sleeper, TokioSleeper};
