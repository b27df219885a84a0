//! Trajectory types.

use serde::{Deserialize, Serialize};

/// A heliocentric position `[x, y, z]`, in astronomical units.
pub type Position = [f64; 3];

/// Orbital paths of an asteroid and of Earth over the same time range.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrajectoryData {
    /// Asteroid positions.
    pub asteroid_path: Vec<Position>,

    /// Earth positions, sampled at the same instants.
    pub earth_path: Vec<Position>,
}

impl TrajectoryData {
    /// Number of sampled points in the asteroid path.
    pub fn len(&self) -> usize {
        self.asteroid_path.len()
    }

    /// Returns true if no points were returned.
    pub fn is_empty(&self) -> bool {
        self.asteroid_path.is_empty()
    }

    /// Smallest asteroid-to-Earth distance across paired samples.
    pub fn closest_approach_au(&self) -> Option<f64> {
        self.asteroid_path
            .iter()
            .zip(&self.earth_path)
            .map(|(a, e)| {
                let (dx, dy, dz) = (a[0] - e[0], a[1] - e[1], a[2] - e[2]);
                (dx * dx + dy * dy + dz * dz).sqrt()
            })
            .min_by(f64::total_cmp)
    }
}
