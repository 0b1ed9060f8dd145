//! Station reading structure.

use serde::{Deserialize, Serialize};

/// One observation point from the embedded station array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: i64,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "latitud")]
    pub latitude: f64,

    #[serde(rename = "longitud")]
    pub longitude: f64,

    /// Observation time as epoch milliseconds, as published
    #[serde(rename = "timestamp")]
    pub observed_at: i64,

    /// `None` when the station has no current reading
    #[serde(rename = "temperatura")]
    pub temperature: Option<f64>,

    /// Millimetres; 0.0 when the source publishes null
    #[serde(rename = "precipitacion", default)]
    pub precipitation: f64,
}

impl Station {
    pub fn has_reading(&self) -> bool {
        self.temperature.is_some()
    }

    /// Case-insensitive substring match on the station name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}
