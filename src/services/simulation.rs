//! Impact and deflection simulation service.

use tracing::instrument;

use super::ServiceContext;
use crate::config::Endpoint;
use crate::errors::AegisResult;
use crate::transport::HttpRequest;
use crate::types::{DeflectionRequest, DeflectionResult, ImpactRequest, ImpactResult};

/// Physics computations performed by the service.
#[derive(Debug, Clone)]
pub struct SimulationService {
    ctx: ServiceContext,
}

impl SimulationService {
    /// Creates a new simulation service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Computes crater size and impact energy.
    ///
    /// Not guarded by the circuit breaker: the computation does not touch
    /// the upstream catalog.
    #[instrument(
        skip(self, request),
        fields(
            endpoint = %Endpoint::ImpactCalculate,
            diameter_km = request.diameter_km,
            velocity_kps = request.velocity_kps
        )
    )]
    pub async fn calculate_impact(&self, request: &ImpactRequest) -> AegisResult<ImpactResult> {
        request.validate()?;
        let http_request = HttpRequest::post("impact/calculate").with_json(request)?;
        self.ctx.call(Endpoint::ImpactCalculate, http_request).await
    }

    /// Computes the orbit after a velocity change.
    #[instrument(
        skip(self, request),
        fields(
            endpoint = %Endpoint::DeflectionCalculate,
            asteroid = %request.asteroid_name,
            delta_v_mps = request.delta_v_mps
        )
    )]
    pub async fn calculate_deflection(
        &self,
        request: &DeflectionRequest,
    ) -> AegisResult<DeflectionResult> {
        request.validate()?;
        let http_request = HttpRequest::post("deflection/calculate").with_json(request)?;
        self.ctx.call(Endpoint::DeflectionCalculate, http_request).await
    }
}
