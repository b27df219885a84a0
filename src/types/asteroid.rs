//! Asteroid record types.
//!
//! Records are shaped after the Small-Body Database response the service
//! forwards. Only the fields the client interprets are typed; everything
//! else is preserved in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Asteroid record returned by `asteroid/{name}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AsteroidData {
    /// Object identification.
    pub object: AsteroidObject,

    /// Orbit solution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<Orbit>,

    /// Physical parameters, as reported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phys_par: Vec<CatalogValue>,

    /// Any other top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AsteroidData {
    /// Looks up an orbital element by name (`a`, `e`, `i`, `om`, `w`, `ma`).
    pub fn element(&self, name: &str) -> Option<f64> {
        self.orbit
            .as_ref()?
            .elements
            .iter()
            .find(|e| e.name == name)?
            .numeric()
    }

    /// Looks up a physical parameter by name (`diameter`, `GM`, `density`).
    pub fn physical(&self, name: &str) -> Option<f64> {
        self.phys_par.iter().find(|p| p.name == name)?.numeric()
    }

    /// Diameter in kilometres, when reported.
    pub fn diameter_km(&self) -> Option<f64> {
        self.physical("diameter")
    }
}

/// Object identification block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AsteroidObject {
    /// Full name, e.g. `"99942 Apophis (2004 MN4)"`.
    pub fullname: String,

    /// Primary designation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub des: Option<String>,

    /// Near-Earth object flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neo: Option<bool>,

    /// Potentially hazardous asteroid flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pha: Option<bool>,

    /// Other identification fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Orbit solution block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Orbit {
    /// Epoch of osculation, Julian date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<Value>,

    /// Orbital elements.
    #[serde(default)]
    pub elements: Vec<CatalogValue>,

    /// Other orbit fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named value as reported by the catalog.
///
/// The catalog reports numbers as strings; [`CatalogValue::numeric`]
/// parses either form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogValue {
    /// Short name.
    pub name: String,

    /// Value, usually a numeric string.
    #[serde(default)]
    pub value: Value,

    /// Unit label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CatalogValue {
    /// Parses the value as a number.
    pub fn numeric(&self) -> Option<f64> {
        match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
