use serde::{Deserialize, Serialize};

/// A single position reported by a location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub description: String,
    pub icon_code: String,
}

/// Current conditions decoded from the weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub place_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    /// Only the first entry is ever shown.
    pub conditions: Vec<ConditionEntry>,
}

impl WeatherReading {
    pub fn primary_condition(&self) -> Option<&ConditionEntry> {
        self.conditions.first()
    }
}

/// Raw image bytes as returned by the icon service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAsset(Vec<u8>);

impl IconAsset {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
