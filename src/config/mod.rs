//! Configuration module for the Aegis client.
//!
//! Provides configuration management for the service base URL, timeouts,
//! retry policy (global and per endpoint), circuit breaker settings and
//! request headers.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::errors::{AegisError, AegisResult};
use crate::resilience::{CircuitBreakerConfig, RetryConfig};

/// Default service root, used when `AEGIS_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path segment every API route lives under.
pub const API_PREFIX: &str = "/api";

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("aegis-client/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the service URL.
pub const ENV_API_URL: &str = "AEGIS_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "AEGIS_TIMEOUT_SECS";

/// Environment variable overriding the retry attempt count.
pub const ENV_MAX_ATTEMPTS: &str = "AEGIS_MAX_ATTEMPTS";

/// Remote operations exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    /// `GET trajectory/{name}`.
    Trajectory,
    /// `GET asteroid/{name}`.
    Asteroid,
    /// `POST impact/calculate`.
    ImpactCalculate,
    /// `POST deflection/calculate`.
    DeflectionCalculate,
    /// `GET asteroids`.
    AsteroidsList,
    /// `GET asteroids/top10-nearest`.
    Top10Nearest,
    /// `GET health`.
    Health,
}

impl Endpoint {
    /// Every endpoint.
    pub const ALL: [Endpoint; 7] = [
        Endpoint::Trajectory,
        Endpoint::Asteroid,
        Endpoint::ImpactCalculate,
        Endpoint::DeflectionCalculate,
        Endpoint::AsteroidsList,
        Endpoint::Top10Nearest,
        Endpoint::Health,
    ];

    /// Stable name used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Trajectory => "get_trajectory",
            Endpoint::Asteroid => "get_asteroid",
            Endpoint::ImpactCalculate => "calculate_impact",
            Endpoint::DeflectionCalculate => "calculate_deflection",
            Endpoint::AsteroidsList => "get_asteroids_list",
            Endpoint::Top10Nearest => "get_top10_nearest",
            Endpoint::Health => "health_check",
        }
    }

    /// Returns true if the endpoint depends on the upstream catalog and is
    /// therefore guarded by the circuit breaker.
    ///
    /// Impact calculation is local physics on the service and health is a
    /// liveness probe; neither should be blocked by catalog outages.
    pub fn uses_circuit_breaker(self) -> bool {
        !matches!(self, Endpoint::ImpactCalculate | Endpoint::Health)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Aegis client.
#[derive(Debug, Clone)]
pub struct AegisConfig {
    /// API base URL, always ending in `/api`.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry policy for endpoints without an override.
    pub retry: RetryConfig,
    /// Circuit breaker settings for the upstream catalog dependency.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Per-endpoint retry policies; each replaces `retry` entirely.
    pub retry_overrides: HashMap<Endpoint, RetryConfig>,
    /// Custom headers to include in requests.
    pub custom_headers: Vec<(String, String)>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl AegisConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AegisConfigBuilder {
        AegisConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AEGIS_API_URL` (optional): Service URL, `/api` appended if missing
    /// - `AEGIS_TIMEOUT_SECS` (optional): Request timeout in seconds
    /// - `AEGIS_MAX_ATTEMPTS` (optional): Total attempts per call
    pub fn from_env() -> AegisResult<Self> {
        AegisConfigBuilder::from_env().build()
    }

    /// Returns the retry policy in force for `endpoint`.
    pub fn retry_for(&self, endpoint: Endpoint) -> &RetryConfig {
        self.retry_overrides.get(&endpoint).unwrap_or(&self.retry)
    }
}

impl Default for AegisConfig {
    fn default() -> Self {
        Self {
            base_url: format!("{DEFAULT_BASE_URL}{API_PREFIX}"),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::upstream(),
            retry_overrides: HashMap::new(),
            custom_headers: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Builder for `AegisConfig`.
#[derive(Debug, Default)]
pub struct AegisConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryConfig>,
    max_attempts: Option<u32>,
    circuit_breaker: Option<CircuitBreakerConfig>,
    retry_overrides: HashMap<Endpoint, RetryConfig>,
    custom_headers: Vec<(String, String)>,
    user_agent: Option<String>,
}

impl AegisConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a builder seeded from `lookup`, which maps variable names to values.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::new();

        if let Some(base_url) = lookup(ENV_API_URL) {
            builder = builder.base_url(base_url);
        }

        if let Some(timeout_str) = lookup(ENV_TIMEOUT_SECS) {
            match timeout_str.trim().parse::<u64>() {
                Ok(secs) => builder = builder.timeout_secs(secs),
                Err(_) => tracing::warn!(
                    var = ENV_TIMEOUT_SECS,
                    value = %timeout_str,
                    "Ignoring unparseable environment value"
                ),
            }
        }

        if let Some(attempts_str) = lookup(ENV_MAX_ATTEMPTS) {
            match attempts_str.trim().parse::<u32>() {
                Ok(attempts) => builder = builder.max_attempts(attempts),
                Err(_) => tracing::warn!(
                    var = ENV_MAX_ATTEMPTS,
                    value = %attempts_str,
                    "Ignoring unparseable environment value"
                ),
            }
        }

        builder
    }

    /// Sets the service URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets the default retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Overrides `max_attempts` of the default retry policy.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Replaces the retry policy for a single endpoint.
    pub fn retry_override(mut self, endpoint: Endpoint, retry: RetryConfig) -> Self {
        self.retry_overrides.insert(endpoint, retry);
        self
    }

    /// Sets the circuit breaker configuration.
    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(config);
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AegisResult<AegisConfig> {
        let base_url = normalize_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(AegisError::configuration("timeout must be greater than zero"));
        }

        let mut retry = self.retry.unwrap_or_default();
        if let Some(attempts) = self.max_attempts {
            retry.max_attempts = attempts;
        }
        retry.validate()?;

        for (endpoint, config) in &self.retry_overrides {
            config.validate().map_err(|e| {
                AegisError::configuration(format!("retry override for {endpoint}: {e}"))
            })?;
        }

        let circuit_breaker = self
            .circuit_breaker
            .unwrap_or_else(CircuitBreakerConfig::upstream);
        circuit_breaker.validate()?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        if user_agent.trim().is_empty() {
            return Err(AegisError::configuration("user agent cannot be empty"));
        }

        for (name, _) in &self.custom_headers {
            if ::http::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(AegisError::configuration(format!(
                    "invalid header name: {name:?}"
                )));
            }
        }

        Ok(AegisConfig {
            base_url,
            timeout,
            retry,
            circuit_breaker,
            retry_overrides: self.retry_overrides,
            custom_headers: self.custom_headers,
            user_agent,
        })
    }
}

/// Trims trailing slashes, appends [`API_PREFIX`] when missing and checks
/// the result is an absolute http(s) URL.
pub fn normalize_base_url(raw: &str) -> AegisResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AegisError::configuration("base URL cannot be empty"));
    }

    let base_url = if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_PREFIX}")
    };

    let parsed = Url::parse(&base_url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AegisError::configuration(format!(
            "base URL must use http or https (got {})",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(AegisError::configuration("base URL must include a host"));
    }

    Ok(base_url)
}
