//! Asteroid catalog service.

use tracing::instrument;

use super::{encode_name, ServiceContext};
use crate::config::Endpoint;
use crate::errors::AegisResult;
use crate::transport::HttpRequest;
use crate::types::{AsteroidData, AsteroidList, AsteroidSummary, NearestApproach, NearestList, TrajectoryData};

/// Catalog-backed operations. Every call goes through the circuit breaker.
#[derive(Debug, Clone)]
pub struct AsteroidsService {
    ctx: ServiceContext,
}

impl AsteroidsService {
    /// Creates a new asteroids service.
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetches the orbital paths of an asteroid and Earth.
    #[instrument(skip(self), fields(endpoint = %Endpoint::Trajectory))]
    pub async fn trajectory(&self, name: &str) -> AegisResult<TrajectoryData> {
        let path = format!("trajectory/{}", encode_name(name)?);
        self.ctx.call(Endpoint::Trajectory, HttpRequest::get(path)).await
    }

    /// Fetches the catalog record of an asteroid.
    #[instrument(skip(self), fields(endpoint = %Endpoint::Asteroid))]
    pub async fn get(&self, name: &str) -> AegisResult<AsteroidData> {
        let path = format!("asteroid/{}", encode_name(name)?);
        self.ctx.call(Endpoint::Asteroid, HttpRequest::get(path)).await
    }

    /// Lists the catalog.
    #[instrument(skip(self), fields(endpoint = %Endpoint::AsteroidsList))]
    pub async fn list(&self) -> AegisResult<Vec<AsteroidSummary>> {
        let list: AsteroidList = self
            .ctx
            .call(Endpoint::AsteroidsList, HttpRequest::get("asteroids"))
            .await?;
        Ok(list.0)
    }

    /// Lists the ten closest upcoming approaches.
    #[instrument(skip(self), fields(endpoint = %Endpoint::Top10Nearest))]
    pub async fn top10_nearest(&self) -> AegisResult<Vec<NearestApproach>> {
        let list: NearestList = self
            .ctx
            .call(Endpoint::Top10Nearest, HttpRequest::get("asteroids/top10-nearest"))
            .await?;
        Ok(list.0)
    }
}
