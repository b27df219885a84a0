//! Retry policy implementation.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::jitter::{JitterSource, RandomJitter};
use super::sleep::{Sleeper, TokioSleeper};
use crate::errors::{AegisError, AegisResult};
use crate::transport::TransportErrorCode;

/// Default total attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default upper bound on any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default backoff multiplier.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Jitter spread as a fraction of the clamped delay, applied symmetrically.
pub const JITTER_RATIO: f64 = 0.25;

/// Status codes retried by default: request timeout, too many requests,
/// internal error, bad gateway, service unavailable, gateway timeout.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Retry configuration.
///
/// Per-call overrides replace the whole struct; fields are never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single pre-jitter delay.
    pub max_delay: Duration,
    /// Delay multiplier for exponential backoff.
    pub backoff_factor: f64,
    /// Service statuses worth retrying.
    pub retryable_status_codes: BTreeSet<u16>,
    /// Transport error codes worth retrying.
    pub retryable_error_codes: BTreeSet<TransportErrorCode>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
            retryable_error_codes: TransportErrorCode::ALL.into_iter().collect(),
        }
    }
}

impl RetryConfig {
    /// Creates a new retry configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of attempts.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff factor.
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Replaces the retryable status codes.
    pub fn retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    /// Replaces the retryable transport error codes.
    pub fn retryable_error_codes(
        mut self,
        codes: impl IntoIterator<Item = TransportErrorCode>,
    ) -> Self {
        self.retryable_error_codes = codes.into_iter().collect();
        self
    }

    /// Creates a configuration that makes exactly one attempt.
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Short configuration for cheap liveness probes.
    pub fn quick() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        }
    }

    /// Checks the invariants the executor relies on.
    pub fn validate(&self) -> AegisResult<()> {
        if self.max_attempts == 0 {
            return Err(AegisError::configuration(
                "max_attempts must be at least 1",
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 1.0 {
            return Err(AegisError::configuration(format!(
                "backoff_factor must be a finite number greater than 1 (got {})",
                self.backoff_factor
            )));
        }
        if self.base_delay > self.max_delay {
            return Err(AegisError::configuration(format!(
                "base_delay ({:?}) must not exceed max_delay ({:?})",
                self.base_delay, self.max_delay
            )));
        }
        Ok(())
    }

    /// Decides whether `err` is worth another attempt.
    ///
    /// Timeouts are always retried. Connectivity failures are retried unless
    /// they carry a transport code outside `retryable_error_codes`. Service
    /// errors are retried only for statuses in `retryable_status_codes`.
    pub fn should_retry(&self, err: &AegisError) -> bool {
        match err {
            AegisError::Timeout { .. } => true,
            AegisError::Connectivity { code, .. } => {
                code.map_or(true, |c| self.retryable_error_codes.contains(&c))
            }
            AegisError::Service { status, .. } => self.retryable_status_codes.contains(status),
            AegisError::CircuitOpen { .. }
            | AegisError::Validation { .. }
            | AegisError::Configuration { .. } => false,
        }
    }
}

/// Pre-jitter delay before the retry that follows `attempt` (1-based):
/// `min(base_delay * backoff_factor^(attempt - 1), max_delay)`.
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let max_secs = config.max_delay.as_secs_f64();
    let secs = config.base_delay.as_secs_f64() * config.backoff_factor.powi(exponent);
    // zero base times an overflowed power
    if secs.is_nan() {
        return Duration::ZERO;
    }

    if secs >= max_secs {
        return config.max_delay;
    }

    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(config.max_delay)
}

/// Applies symmetric jitter to `delay`.
///
/// `sample` is clamped to `[-1.0, 1.0]` and scales [`JITTER_RATIO`] of the
/// delay; the result is never negative.
pub fn apply_jitter(delay: Duration, sample: f64) -> Duration {
    let sample = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    let base = delay.as_secs_f64();
    let jittered = base + base * JITTER_RATIO * sample;

    // saturates when the jittered delay exceeds `Duration::MAX`
    Duration::try_from_secs_f64(jittered.max(0.0)).unwrap_or(Duration::MAX)
}

/// Executes operations with retries, exponential backoff, and jitter.
#[derive(Clone)]
pub struct RetryExecutor {
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn JitterSource>,
}

impl RetryExecutor {
    /// Creates an executor that sleeps on the tokio timer with random jitter.
    pub fn new() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }

    /// Replaces the sleeper.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replaces the jitter source.
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Final delay before the retry that follows `attempt`.
    pub fn delay_for(&self, config: &RetryConfig, attempt: u32) -> Duration {
        apply_jitter(backoff_delay(config, attempt), self.jitter.sample())
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or `config.max_attempts` attempts have been made. The error returned is
    /// always the one from the last attempt.
    #[instrument(skip(self, config, operation), fields(max_attempts = config.max_attempts))]
    pub async fn execute<F, Fut, T>(&self, config: &RetryConfig, operation: F) -> AegisResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AegisResult<T>>,
    {
        let max_attempts = config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Request succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if attempt >= max_attempts {
                        if max_attempts > 1 {
                            tracing::error!(
                                attempts = attempt,
                                error_kind = %err.kind(),
                                error = %err,
                                "Retries exhausted"
                            );
                        }
                        return Err(err);
                    }

                    if !config.should_retry(&err) {
                        tracing::debug!(
                            attempt,
                            error_kind = %err.kind(),
                            error = %err,
                            "Error is not retryable"
                        );
                        return Err(err);
                    }

                    let delay = self.delay_for(config, attempt);

                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error_kind = %err.kind(),
                        error = %err,
                        "Retrying after error"
                    );

                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor").finish_non_exhaustive()
    }
}
