//! Health check service.

use tracing::instrument;

use super::ServiceContext;
use crate::config::Endpoint;
use crate::errors::AegisResult;
use crate::transport::HttpRequest;
use crate::types::HealthStatus;

/// Service liveness probe.
#[derive(Debug, Clone)]
pub struct HealthService {
    ctx: ServiceContext,
}

impl HealthService {
    /// Creates a new health service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Asks the service whether it is up.
    #[instrument(skip(self), fields(endpoint = %Endpoint::Health))]
    pub async fn check(&self) -> AegisResult<HealthStatus> {
        self.ctx.call(Endpoint::Health, HttpRequest::get("health")).await
    }
}
