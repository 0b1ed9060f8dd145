//! Pipeline entry points for weather operations.
//!
//! - `assemble`: Extract a snapshot from a page and classify the fetch
//! - `resilience`: Fall back to the last saved snapshot
//! - `weather`: Run fetch, assembly and fallback in sequence

pub mod assemble;
pub mod resilience;
pub mod weather;

pub use assemble::{FetchState, SnapshotAssembler};
pub use resilience::Resilience;
pub use weather::{WeatherPipeline, get_weather};
