//! Aegis Client Library
//!
//! A resilient Rust client for the Aegis asteroid visualization service:
//! asteroid orbital data from an upstream catalog, trajectory computation,
//! and impact and deflection physics.
//!
//! # Features
//!
//! - **Error taxonomy**: every remote failure is classified as a service,
//!   connectivity or timeout error
//! - **Retries**: bounded exponential backoff with ±25% jitter, configurable
//!   per endpoint
//! - **Circuit breaker**: catalog-backed calls fail fast while the upstream
//!   dependency is unhealthy, then probe for recovery
//! - **Observability**: structured `tracing` events and request metrics
//! - **Async/Await**: built on Tokio
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aegis_client::{AegisClient, DeflectionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     aegis_client::observability::init_tracing(Default::default())?;
//!
//!     let client = AegisClient::from_env()?;
//!
//!     let asteroid = client.get_asteroid("Apophis").await?;
//!     println!("{}", asteroid.object.fullname);
//!
//!     let request = DeflectionRequest::new("Apophis", 0.05, 30.0);
//!     let result = client.calculate_deflection(&request).await?;
//!     println!("semi-major axis shift: {:+.6} au", result.semi_major_axis_shift());
//!     Ok(())
//! }
//! ```
//!
//! # Handling Failures
//!
//! ```rust,no_run
//! use aegis_client::{AegisClient, AegisError, RetryConfig};
//!
//! # async fn run(client: AegisClient) {
//! match client.get_top10_nearest().await {
//!     Ok(list) => println!("{} approaches", list.len()),
//!     Err(AegisError::CircuitOpen { retry_after }) => {
//!         println!("backing off for {retry_after:?}");
//!     }
//!     Err(err) => println!("{}", err.user_message(&RetryConfig::default())),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{AegisClient, AegisClientBuilder};
pub use config::{AegisConfig, AegisConfigBuilder, Endpoint};
pub use errors::{AegisError, AegisResult, ErrorKind};
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState, RetryConfig,
    RetryExecutor,
};
pub use transport::{HttpTransport, TransportErrorCode};

// Type re-exports
pub use types::{
    AsteroidData, AsteroidSummary, DeflectionRequest, DeflectionResult, HealthStatus,
    ImpactRequest, ImpactResult, NearestApproach, TrajectoryData,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
