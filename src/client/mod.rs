//! Aegis API client.
//!
//! Provides the main client interface for the asteroid data and impact
//! simulation service.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AegisConfig, AegisConfigBuilder, Endpoint};
use crate::errors::{AegisError, AegisResult};
use crate::observability::RequestObserver;
use crate::pipeline::RequestPipeline;
use crate::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot, Clock, JitterSource,
    RetryConfig, RetryExecutor, Sleeper,
};
use crate::services::{AsteroidsService, HealthService, ServiceContext, SimulationService};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{
    AsteroidData, AsteroidSummary, DeflectionRequest, DeflectionResult, HealthStatus,
    ImpactRequest, ImpactResult, NearestApproach, TrajectoryData,
};

/// Name of the breaker guarding the upstream catalog dependency.
pub const UPSTREAM_BREAKER_NAME: &str = "upstream-catalog";

/// The main Aegis client.
///
/// One method per remote operation. Every call is retried according to the
/// endpoint's [`RetryConfig`]; catalog-backed calls also pass through a
/// shared [`CircuitBreaker`].
///
/// # Example
///
/// ```rust,no_run
/// use aegis_client::{AegisClient, ImpactRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = AegisClient::builder()
///         .base_url("http://localhost:8000")
///         .build()?;
///
///     let trajectory = client.get_trajectory("Apophis").await?;
///     println!("{} points", trajectory.len());
///
///     let impact = client
///         .calculate_impact(&ImpactRequest::new(0.34, 7.42))
///         .await?;
///     println!("{:.1} Mt", impact.impact_energy_megatons);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AegisClient {
    config: Arc<AegisConfig>,
    breaker: Arc<CircuitBreaker>,
    asteroids_service: AsteroidsService,
    simulation_service: SimulationService,
    health_service: HealthService,
}

impl AegisClient {
    /// Creates a new client builder.
    pub fn builder() -> AegisClientBuilder {
        AegisClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `AEGIS_API_URL`, `AEGIS_TIMEOUT_SECS` and `AEGIS_MAX_ATTEMPTS`.
    pub fn from_env() -> AegisResult<Self> {
        AegisClientBuilder::from_env().build()
    }

    /// Fetches the orbital paths of an asteroid and Earth.
    pub async fn get_trajectory(&self, name: &str) -> AegisResult<TrajectoryData> {
        self.asteroids_service.trajectory(name).await
    }

    /// Fetches the catalog record of an asteroid.
    pub async fn get_asteroid(&self, name: &str) -> AegisResult<AsteroidData> {
        self.asteroids_service.get(name).await
    }

    /// Computes crater size and impact energy.
    pub async fn calculate_impact(&self, request: &ImpactRequest) -> AegisResult<ImpactResult> {
        self.simulation_service.calculate_impact(request).await
    }

    /// Computes the orbit after a velocity change.
    pub async fn calculate_deflection(
        &self,
        request: &DeflectionRequest,
    ) -> AegisResult<DeflectionResult> {
        self.simulation_service.calculate_deflection(request).await
    }

    /// Lists the catalog.
    pub async fn get_asteroids_list(&self) -> AegisResult<Vec<AsteroidSummary>> {
        self.asteroids_service.list().await
    }

    /// Lists the ten closest upcoming approaches.
    pub async fn get_top10_nearest(&self) -> AegisResult<Vec<NearestApproach>> {
        self.asteroids_service.top10_nearest().await
    }

    /// Asks the service whether it is up.
    pub async fn health_check(&self) -> AegisResult<HealthStatus> {
        self.health_service.check().await
    }

    /// Reads the shared breaker's state without making a call.
    pub fn circuit_breaker_state(&self) -> CircuitBreakerSnapshot {
        self.breaker.snapshot()
    }

    /// Returns the shared circuit breaker.
    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Returns the asteroids service.
    pub fn asteroids(&self) -> &AsteroidsService {
        &self.asteroids_service
    }

    /// Returns the simulation service.
    pub fn simulation(&self) -> &SimulationService {
        &self.simulation_service
    }

    /// Returns the health service.
    pub fn health(&self) -> &HealthService {
        &self.health_service
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AegisConfig {
        &self.config
    }
}

impl std::fmt::Debug for AegisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AegisClient")
            .field("config", &self.config)
            .field("breaker", &self.breaker)
            .finish_non_exhaustive()
    }
}

/// Builder for the Aegis client.
pub struct AegisClientBuilder {
    config_builder: AegisConfigBuilder,
    config: Option<AegisConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    breaker: Option<Arc<CircuitBreaker>>,
    observers: Vec<Arc<dyn RequestObserver>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    jitter: Option<Arc<dyn JitterSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AegisClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self::with_config_builder(AegisConfigBuilder::new())
    }

    /// Creates a builder seeded from environment variables.
    pub fn from_env() -> Self {
        Self::with_config_builder(AegisConfigBuilder::from_env())
    }

    /// Creates a builder from an existing configuration.
    ///
    /// Configuration setters on this builder are ignored afterwards.
    pub fn from_config(config: AegisConfig) -> Self {
        let mut builder = Self::new();
        builder.config = Some(config);
        builder
    }

    fn with_config_builder(config_builder: AegisConfigBuilder) -> Self {
        Self {
            config_builder,
            config: None,
            transport: None,
            breaker: None,
            observers: Vec::new(),
            sleeper: None,
            jitter: None,
            clock: None,
        }
    }

    /// Sets the service URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the default retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(retry);
        self
    }

    /// Replaces the retry policy for one endpoint.
    pub fn retry_override(mut self, endpoint: Endpoint, retry: RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry_override(endpoint, retry);
        self
    }

    /// Sets the circuit breaker configuration.
    pub fn circuit_breaker_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.config_builder = self.config_builder.circuit_breaker(config);
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.header(name, value);
        self
    }

    /// Sets the `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(user_agent);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Shares an existing circuit breaker instead of creating one.
    pub fn circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Registers a request observer in addition to the tracing observer.
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Sets the sleeper used between retries.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Sets the jitter source used for retry delays.
    pub fn jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Sets the clock of the breaker created by [`build`](Self::build).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the client.
    pub fn build(self) -> AegisResult<AegisClient> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_builder.build()?,
        };

        // Create transport
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                ReqwestTransport::new(&config.base_url, config.timeout)
                    .map_err(|e| AegisError::configuration(e.to_string()))?,
            ),
        };

        let pipeline = self
            .observers
            .into_iter()
            .fold(RequestPipeline::from_config(transport, &config), |p, o| {
                p.with_observer(o)
            });

        let mut retry = RetryExecutor::new();
        if let Some(sleeper) = self.sleeper {
            retry = retry.with_sleeper(sleeper);
        }
        if let Some(jitter) = self.jitter {
            retry = retry.with_jitter(jitter);
        }

        let breaker = match self.breaker {
            Some(b) => b,
            None => {
                let breaker =
                    CircuitBreaker::new(UPSTREAM_BREAKER_NAME, config.circuit_breaker.clone());
                Arc::new(match self.clock {
                    Some(clock) => breaker.with_clock(clock),
                    None => breaker,
                })
            }
        };

        let config = Arc::new(config);
        let ctx = ServiceContext::new(
            Arc::clone(&config),
            Arc::new(pipeline),
            retry,
            Arc::clone(&breaker),
        );

        tracing::debug!(base_url = %config.base_url, "Aegis client created");

        Ok(AegisClient {
            config,
            breaker,
            asteroids_service: AsteroidsService::new(ctx.clone()),
            simulation_service: SimulationService::new(ctx.clone()),
            health_service: HealthService::new(ctx),
        })
    }
}

impl Default for AegisClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::mocks::{fixtures, ManualClock, MockResponse, MockTransport, RecordingSleeper, SequenceJitter};
    use crate::resilience::CircuitState;
    use crate::transport::{HttpMethod, TransportError};

    struct Harness {
        client: AegisClient,
        transport: Arc<MockTransport>,
        sleeper: Arc<RecordingSleeper>,
        clock: Arc<ManualClock>,
    }

    fn harness(builder: AegisClientBuilder) -> Harness {
        let transport = Arc::new(MockTransport::new());
        let clock = Arc::new(ManualClock::new());
        let sleeper = Arc::new(RecordingSleeper::with_clock(clock.clone()));
        let client = builder
            .transport(transport.clone())
            .sleeper(sleeper.clone())
            .jitter(Arc::new(SequenceJitter::constant(0.0)))
            .clock(clock.clone())
            .build()
            .unwrap();
        Harness {
            client,
            transport,
            sleeper,
            clock,
        }
    }

    fn refused() -> TransportError {
        TransportError::Connection {
            message: "connection refused".to_string(),
            code: None,
        }
    }

    #[tokio::test]
    async fn test_get_trajectory_escapes_name() {
        let h = harness(AegisClient::builder());
        h.transport.queue_json(&fixtures::trajectory(4));

        let data = h.client.get_trajectory("2004 MN4").await.unwrap();

        assert_eq!(data.len(), 4);
        let sent = h.transport.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.path, "trajectory/2004%20MN4");
    }

    #[tokio::test]
    async fn test_empty_name_never_reaches_transport() {
        let h = harness(AegisClient::builder());

        let err = h.client.get_asteroid(" ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_calculate_impact_posts_json() {
        let h = harness(AegisClient::builder());
        h.transport.queue_json(&fixtures::impact_result());

        let result = h
            .client
            .calculate_impact(&ImpactRequest::new(0.34, 7.42))
            .await
            .unwrap();

        assert_eq!(result.impact_energy_megatons, 177.58);
        let sent = h.transport.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.path, "impact/calculate");
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["diameter_km"], 0.34);
        assert_eq!(body["target_density_kg_m3"], 2500.0);
    }

    #[tokio::test]
    async fn test_invalid_impact_rejected_locally() {
        let h = harness(AegisClient::builder());

        let err = h
            .client
            .calculate_impact(&ImpactRequest::new(2000.0, 7.42))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_count_once_against_breaker() {
        let h = harness(AegisClient::builder());
        h.transport.set_default_failure(refused());

        let err = h.client.get_asteroids_list().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(h.transport.request_count(), 3);
        assert_eq!(h.sleeper.sleeps().len(), 2);
        assert_eq!(h.client.circuit_breaker_state().failure_count, 1);
    }

    #[tokio::test]
    async fn test_impact_and_health_bypass_breaker() {
        let h = harness(
            AegisClient::builder()
                .retry(RetryConfig::no_retries())
                .circuit_breaker_config(CircuitBreakerConfig::new().failure_threshold(1)),
        );
        h.transport.queue_error(500, "catalog down");
        let _ = h.client.get_top10_nearest().await;
        assert_eq!(h.client.circuit_breaker_state().state, CircuitState::Open);

        h.transport.queue_json(&fixtures::impact_result());
        h.transport.queue_json(&fixtures::health());
        assert!(h
            .client
            .calculate_impact(&ImpactRequest::new(1.0, 20.0))
            .await
            .is_ok());
        assert!(h.client.health_check().await.unwrap().is_healthy());

        let err = h.client.get_trajectory("Apophis").await.unwrap_err();
        assert!(err.is_circuit_open());
        assert_eq!(h.transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_impact_failures_do_not_trip_breaker() {
        let h = harness(
            AegisClient::builder()
                .retry(RetryConfig::no_retries())
                .circuit_breaker_config(CircuitBreakerConfig::new().failure_threshold(1)),
        );
        h.transport.queue_error(500, "solver crashed");

        let _ = h
            .client
            .calculate_impact(&ImpactRequest::new(1.0, 20.0))
            .await;

        assert_eq!(h.client.circuit_breaker_state().state, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_breaker_recovers_after_reset_timeout() {
        let h = harness(
            AegisClient::builder()
                .retry(RetryConfig::no_retries())
                .circuit_breaker_config(
                    CircuitBreakerConfig::new()
                        .failure_threshold(1)
                        .reset_timeout(Duration::from_secs(30)),
                ),
        );
        h.transport.queue_error(503, "busy");
        let _ = h.client.get_asteroid("Apophis").await;

        h.clock.advance(Duration::from_secs(30));
        h.transport.queue_json(&fixtures::apophis());
        let record = h.client.get_asteroid("Apophis").await.unwrap();

        assert_eq!(record.diameter_km(), Some(0.34));
        let state = h.client.circuit_breaker_state();
        assert_eq!(state.state, CircuitState::Closed);
        assert_eq!(state.failure_count, 0);
    }

    #[tokio::test]
    async fn test_retry_override_applies_to_single_endpoint() {
        let h = harness(
            AegisClient::builder().retry_override(Endpoint::Health, RetryConfig::no_retries()),
        );
        h.transport.set_default(MockResponse::error(503, "starting up"));

        let _ = h.client.health_check().await;
        assert_eq!(h.transport.request_count(), 1);

        h.transport.clear_requests();
        let _ = h.client.get_asteroids_list().await;
        assert_eq!(h.transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_shared_breaker_across_clients() {
        let breaker = Arc::new(CircuitBreaker::new(
            "shared",
            CircuitBreakerConfig::new().failure_threshold(1),
        ));
        let a = harness(
            AegisClient::builder()
                .retry(RetryConfig::no_retries())
                .circuit_breaker(breaker.clone()),
        );
        let b = harness(AegisClient::builder().circuit_breaker(breaker.clone()));
        a.transport.queue_error(500, "down");

        let _ = a.client.get_asteroids_list().await;
        let err = b.client.get_asteroids_list().await.unwrap_err();

        assert!(err.is_circuit_open());
        assert_eq!(b.transport.request_count(), 0);
    }

    #[test]
    fn test_default_breaker_uses_upstream_settings() {
        let h = harness(AegisClient::builder());
        let state = h.client.circuit_breaker_state();

        assert_eq!(state.failure_threshold, 3);
        assert_eq!(state.reset_timeout, Duration::from_secs(30));
        assert_eq!(h.client.circuit_breaker().name(), UPSTREAM_BREAKER_NAME);
    }
}
