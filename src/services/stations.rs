// src/services/stations.rs

//! Station extractor.
//!
//! Station readings are published as a script-level array literal, e.g.
//!
//! ```text
//! var vEstaciones = [[20,"La Punta",-33.18,-66.31,new Date(1700000000000),24.5,null], ...];
//! ```
//!
//! Extraction is best-effort per entry: a malformed entry is skipped and the
//! rest are kept.

use regex::{Captures, Regex};

use crate::error::Result;
use crate::models::{MarkupConfig, Station};

const NULL_SENTINEL: &str = "null";

/// Extracts station readings from the raw page.
#[derive(Debug, Clone)]
pub struct StationExtractor {
    array: Regex,
    entry: Regex,
}

impl StationExtractor {
    pub fn new(markup: &MarkupConfig) -> Result<Self> {
        let array = format!(
            r"(?s)var\s+{}\s*=\s*\[(.*?)\];",
            regex::escape(markup.stations_var.trim())
        );
        Ok(Self {
            array: Regex::new(&array)?,
            entry: Regex::new(
                r#"\[(\d+),"([^"]+)",(-?\d+\.?\d*),(-?\d+\.?\d*),new Date\((\d+)\),([^,\]]*),([^,\]]*)"#,
            )?,
        })
    }

    /// All well-formed stations, in source order.
    pub fn extract(&self, html: &str) -> Vec<Station> {
        let Some(body) = self.array.captures(html).and_then(|caps| caps.get(1)) else {
            log::warn!("Station array not found; no station readings");
            return Vec::new();
        };

        let mut stations = Vec::new();
        let mut skipped = 0usize;
        for caps in self.entry.captures_iter(body.as_str()) {
            match parse_entry(&caps) {
                Ok(station) => stations.push(station),
                Err(reason) => {
                    skipped += 1;
                    log::debug!("Skipping station entry {}: {}", &caps[0], reason);
                }
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} malformed station entries", skipped);
        }
        stations
    }
}

fn parse_entry(caps: &Captures<'_>) -> std::result::Result<Station, String> {
    let id = caps[1]
        .parse::<i64>()
        .map_err(|e| format!("id: {e}"))?;
    let latitude = caps[3]
        .parse::<f64>()
        .map_err(|e| format!("latitude: {e}"))?;
    let longitude = caps[4]
        .parse::<f64>()
        .map_err(|e| format!("longitude: {e}"))?;
    let observed_at = caps[5]
        .parse::<i64>()
        .map_err(|e| format!("timestamp: {e}"))?;

    let temperature = match caps[6].trim() {
        "" | NULL_SENTINEL => None,
        raw => Some(
            raw.parse::<f64>()
                .map_err(|e| format!("temperature '{raw}': {e}"))?,
        ),
    };
    let precipitation = match caps[7].trim() {
        NULL_SENTINEL => 0.0,
        raw => raw
            .parse::<f64>()
            .map_err(|e| format!("precipitation '{raw}': {e}"))?,
    };

    Ok(Station {
        id,
        name: caps[2].to_string(),
        latitude,
        longitude,
        observed_at,
        temperature,
        precipitation,
    })
}
