//! Type definitions for the Aegis API.
//!
//! Request and response payloads for every remote operation.

pub mod asteroid;
pub mod catalog;
pub mod deflection;
pub mod health;
pub mod impact;
pub mod trajectory;

pub use asteroid::{AsteroidData, AsteroidObject, CatalogValue, Orbit};
pub use catalog::{AsteroidList, AsteroidSummary, NearestApproach, NearestList};
pub use deflection::{DeflectedElements, DeflectionRequest, DeflectionResult, OrbitShape, PathPoint};
pub use health::HealthStatus;
pub use impact::{ImpactRequest, ImpactResult};
pub use trajectory::{Position, TrajectoryData};
