//! Place returned by the hospital and medical shop lookups

use serde::{Deserialize, Deserializer};

/// A named point of interest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub name: String,
    /// Latitude in decimal degrees
    #[serde(default = "missing_coordinate", deserialize_with = "lenient_coordinate")]
    pub lat: f64,
    /// Longitude in decimal degrees
    #[serde(default = "missing_coordinate", deserialize_with = "lenient_coordinate")]
    pub lon: f64,
}

impl Place {
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    /// Coordinates rounded to three decimals, e.g. `(12.346, 77.123)`
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("({:.3}, {:.3})", self.lat, self.lon)
    }
}

/// Body of a lookup response. A missing or null `results` field reads as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResults {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Place>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Place>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Place>>::deserialize(deserializer)?.unwrap_or_default())
}

fn missing_coordinate() -> f64 {
    f64::NAN
}

/// Geocoders hand back coordinates as numbers or as numeric strings.
/// Anything unparseable becomes NaN and prints as such.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}
