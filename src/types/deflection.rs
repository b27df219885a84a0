//! Deflection calculation types.

use serde::{Deserialize, Serialize};

use crate::errors::{AegisError, AegisResult};

/// Default number of trajectory samples.
pub const DEFAULT_NUM_POINTS: u32 = 365;

/// Deflection calculation request: a velocity change applied to an
/// asteroid some days after its orbital epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionRequest {
    /// Asteroid name or designation.
    pub asteroid_name: String,

    /// Velocity change in m/s; negative values slow the asteroid.
    pub delta_v_mps: f64,

    /// Days after the orbital epoch at which the change is applied.
    pub days_from_epoch: f64,

    /// Number of trajectory samples to return.
    #[serde(default = "default_num_points")]
    pub num_points: u32,
}

fn default_num_points() -> u32 {
    DEFAULT_NUM_POINTS
}

impl DeflectionRequest {
    /// Creates a request with the default sample count.
    pub fn new(asteroid_name: impl Into<String>, delta_v_mps: f64, days_from_epoch: f64) -> Self {
        Self {
            asteroid_name: asteroid_name.into(),
            delta_v_mps,
            days_from_epoch,
            num_points: DEFAULT_NUM_POINTS,
        }
    }

    /// Sets the sample count.
    pub fn num_points(mut self, num_points: u32) -> Self {
        self.num_points = num_points;
        self
    }

    /// Validates the request.
    pub fn validate(&self) -> AegisResult<()> {
        if self.asteroid_name.trim().is_empty() {
            return Err(AegisError::validation_param(
                "Asteroid name is required",
                "asteroid_name",
            ));
        }
        if !self.delta_v_mps.is_finite() {
            return Err(AegisError::validation_param(
                "delta_v_mps must be a finite number",
                "delta_v_mps",
            ));
        }
        if !self.days_from_epoch.is_finite() {
            return Err(AegisError::validation_param(
                "days_from_epoch must be a finite number",
                "days_from_epoch",
            ));
        }
        if self.num_points == 0 {
            return Err(AegisError::validation_param(
                "num_points must be at least 1",
                "num_points",
            ));
        }
        Ok(())
    }
}

/// Cartesian point of a deflected path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// Shape elements of the orbit before deflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitShape {
    /// Semi-major axis, au.
    pub a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Inclination, degrees.
    pub i: f64,
}

/// Full element set of the orbit after deflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectedElements {
    /// Semi-major axis, au.
    pub a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Inclination, degrees.
    pub i: f64,
    /// Right ascension of the ascending node, degrees.
    pub raan: f64,
    /// Argument of periapsis, degrees.
    pub argp: f64,
    /// True anomaly, degrees.
    pub nu: f64,
}

/// Deflection calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionResult {
    /// Whether the service computed a deflected orbit.
    pub success: bool,

    /// Asteroid the deflection was applied to.
    pub asteroid_name: String,

    /// Velocity change applied, m/s.
    pub delta_v_applied_mps: f64,

    /// Days after epoch when the change was applied.
    pub deflection_time_days: f64,

    /// Orbit before the change.
    pub original_elements: OrbitShape,

    /// Orbit after the change.
    pub deflected_elements: DeflectedElements,

    /// Sampled deflected path.
    #[serde(default)]
    pub deflected_path: Vec<PathPoint>,

    /// Number of samples in `deflected_path`.
    #[serde(default)]
    pub path_points: usize,
}

impl DeflectionResult {
    /// Change in semi-major axis, au.
    pub fn semi_major_axis_shift(&self) -> f64 {
        self.deflected_elements.a - self.original_elements.a
    }
}
