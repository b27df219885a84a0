//! Service implementations for the Aegis API.
//!
//! Each service groups related remote operations. All of them share one
//! [`ServiceContext`], which routes every call through the retry executor
//! and, for catalog-backed endpoints, the shared circuit breaker.

mod asteroids;
mod health;
mod simulation;

pub use asteroids::AsteroidsService;
pub use health::HealthService;
pub use simulation::SimulationService;

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::{AegisConfig, Endpoint};
use crate::errors::{AegisError, AegisResult};
use crate::pipeline::RequestPipeline;
use crate::resilience::{CircuitBreaker, RetryExecutor};
use crate::transport::HttpRequest;

/// Collaborators shared by every service.
#[derive(Clone)]
pub struct ServiceContext {
    config: Arc<AegisConfig>,
    pipeline: Arc<RequestPipeline>,
    retry: RetryExecutor,
    breaker: Arc<CircuitBreaker>,
}

impl ServiceContext {
    /// Creates a new service context.
    pub fn new(
        config: Arc<AegisConfig>,
        pipeline: Arc<RequestPipeline>,
        retry: RetryExecutor,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            config,
            pipeline,
            retry,
            breaker,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AegisConfig {
        &self.config
    }

    /// Returns the shared circuit breaker.
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Runs one logical call: retries around the pipeline, with the breaker
    /// outermost for guarded endpoints so an exhausted retry sequence counts
    /// as a single breaker failure.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: HttpRequest,
    ) -> AegisResult<T> {
        let retry_config = self.config.retry_for(endpoint);
        let attempt = || self.pipeline.send_json::<T>(endpoint, request.clone());

        if endpoint.uses_circuit_breaker() {
            self.breaker
                .execute(|| self.retry.execute(retry_config, attempt))
                .await
        } else {
            self.retry.execute(retry_config, attempt).await
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("base_url", &self.config.base_url)
            .field("breaker", &self.breaker)
            .finish_non_exhaustive()
    }
}

/// Validates an asteroid name and percent-encodes it for use as a path segment.
pub(crate) fn encode_name(name: &str) -> AegisResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AegisError::validation_param(
            "Asteroid name is required",
            "asteroid_name",
        ));
    }
    Ok(urlencoding::encode(name).into_owned())
}
