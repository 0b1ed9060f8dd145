//! Service layer for the weather pipeline.
//!
//! This module contains the extraction logic for:
//! - The prose bulletin (`BulletinParser`)
//! - Temperature bound inference (`TemperatureRules`)
//! - Embedded station readings (`StationExtractor`)

mod bulletin;
mod stations;
pub mod temperatures;

pub use bulletin::BulletinParser;
pub use stations::StationExtractor;
pub use temperatures::{LoneReading, TemperatureRules};
