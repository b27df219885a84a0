//! Impact calculation types.

use serde::{Deserialize, Serialize};

use crate::errors::{AegisError, AegisResult};

/// Default asteroid bulk density, kg/m³ (stony body).
pub const DEFAULT_ASTEROID_DENSITY: f64 = 3000.0;

/// Default target density, kg/m³ (sedimentary rock).
pub const DEFAULT_TARGET_DENSITY: f64 = 2500.0;

/// Largest accepted diameter, km.
pub const MAX_DIAMETER_KM: f64 = 1000.0;

/// Largest accepted velocity, km/s.
pub const MAX_VELOCITY_KPS: f64 = 100.0;

/// Largest accepted density, kg/m³.
pub const MAX_DENSITY_KG_M3: f64 = 20000.0;

/// Joules per megaton of TNT.
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Impact calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRequest {
    /// Asteroid diameter in kilometres, in (0, 1000].
    pub diameter_km: f64,

    /// Impact velocity in km/s, in (0, 100].
    pub velocity_kps: f64,

    /// Asteroid density in kg/m³, in (0, 20000].
    #[serde(default = "default_asteroid_density")]
    pub asteroid_density_kg_m3: f64,

    /// Target material density in kg/m³, in (0, 20000].
    #[serde(default = "default_target_density")]
    pub target_density_kg_m3: f64,
}

fn default_asteroid_density() -> f64 {
    DEFAULT_ASTEROID_DENSITY
}

fn default_target_density() -> f64 {
    DEFAULT_TARGET_DENSITY
}

impl ImpactRequest {
    /// Creates a request with default densities.
    pub fn new(diameter_km: f64, velocity_kps: f64) -> Self {
        Self {
            diameter_km,
            velocity_kps,
            asteroid_density_kg_m3: DEFAULT_ASTEROID_DENSITY,
            target_density_kg_m3: DEFAULT_TARGET_DENSITY,
        }
    }

    /// Sets the asteroid density.
    pub fn asteroid_density(mut self, kg_m3: f64) -> Self {
        self.asteroid_density_kg_m3 = kg_m3;
        self
    }

    /// Sets the target density.
    pub fn target_density(mut self, kg_m3: f64) -> Self {
        self.target_density_kg_m3 = kg_m3;
        self
    }

    /// Validates the request against the ranges the service accepts.
    pub fn validate(&self) -> AegisResult<()> {
        check_range("diameter_km", self.diameter_km, MAX_DIAMETER_KM, "km")?;
        check_range("velocity_kps", self.velocity_kps, MAX_VELOCITY_KPS, "km/s")?;
        check_range(
            "asteroid_density_kg_m3",
            self.asteroid_density_kg_m3,
            MAX_DENSITY_KG_M3,
            "kg/m³",
        )?;
        check_range(
            "target_density_kg_m3",
            self.target_density_kg_m3,
            MAX_DENSITY_KG_M3,
            "kg/m³",
        )
    }
}

fn check_range(param: &str, value: f64, max: f64, unit: &str) -> AegisResult<()> {
    if !value.is_finite() {
        return Err(AegisError::validation_param(
            format!("{param} must be a finite number"),
            param,
        ));
    }
    if value <= 0.0 || value > max {
        return Err(AegisError::validation_param(
            format!("{param} must be greater than 0 and at most {max} {unit} (got {value})"),
            param,
        ));
    }
    Ok(())
}

/// Impact calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Final crater diameter in metres.
    pub crater_diameter_meters: f64,

    /// Kinetic energy at impact in joules.
    pub impact_energy_joules: f64,

    /// Impactor mass in kilograms.
    pub mass_kg: f64,

    /// Final crater diameter in kilometres.
    pub crater_diameter_km: f64,

    /// Kinetic energy in megatons of TNT.
    pub impact_energy_megatons: f64,
}
