//! Catalog listing types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Catalog entry returned by `asteroids`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AsteroidSummary {
    /// Display name.
    pub name: String,

    /// Catalog designation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,

    /// Mean diameter, km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_km: Option<f64>,

    /// Typical approach velocity, km/s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_kps: Option<f64>,

    /// Bulk density, kg/m³.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_kg_m3: Option<f64>,

    /// Mass, kg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_kg: Option<f64>,

    /// Where the physical data comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Any other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry returned by `asteroids/top10-nearest`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NearestApproach {
    /// Display name.
    pub name: String,

    /// Close approach date as reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_approach_date: Option<String>,

    /// Miss distance, km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miss_distance_km: Option<f64>,

    /// Relative velocity at approach, km/s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_velocity_kps: Option<f64>,

    /// Estimated diameter, km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_km: Option<f64>,

    /// Potentially hazardous flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hazardous: Option<bool>,

    /// Any other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Listings arrive either as a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "nearest", alias = "data")]
        asteroids: Vec<T>,
    },
}

/// Deserializes a listing in either shape into a vector.
fn deserialize_listing<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Listing::deserialize(deserializer)? {
        Listing::Bare(items) | Listing::Wrapped { asteroids: items } => items,
    })
}

/// Catalog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidList(pub Vec<AsteroidSummary>);

impl<'de> Deserialize<'de> for AsteroidList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_listing(deserializer).map(AsteroidList)
    }
}

/// Nearest-approach listing.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestList(pub Vec<NearestApproach>);

impl<'de> Deserialize<'de> for NearestList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_listing(deserializer).map(NearestList)
    }
}
