use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to another body, by position in the `bodies` list or by name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BodyRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Body {
    pub name: String,
    pub color: [f32; 3],
    #[serde(default)]
    pub orbital_radius: f64,
    #[serde(default)]
    pub orbital_tilt: f64,
    pub orbital_period: f64,
    pub radius: f64,
    #[serde(default)]
    pub axis_tilt: f64,
    pub rotation_period: f64,
    /// The body this one orbits. Omitted, or the body itself, for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbits: Option<BodyRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SolarSystem {
    /// Factor applied to every radius so bodies stay visible next to their orbits.
    #[serde(default = "default_magnification")]
    pub magnification: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<DateTime<Utc>>,
    /// Body followed by the Earth-relative view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_body: Option<BodyRef>,
    pub bodies: Vec<Body>,
}

pub const DEFAULT_MAGNIFICATION: f64 = 1000.0;

fn default_magnification() -> f64 {
    DEFAULT_MAGNIFICATION
}
