// src/models/mod.rs

//! Domain models for the weather pipeline.
//!
//! This module contains the configuration tree and the snapshot records
//! produced by a pipeline run.

mod config;
mod snapshot;
mod station;

// Re-export all public types
pub use config::{
    CacheConfig, Config, ENV_CACHE_FILE, ENV_URL, LoggingConfig, MarkupConfig, RetryConfig,
    SourceConfig, parse_selector,
};
pub use snapshot::{
    Alert, CurrentState, ExtendedDay, Forecast, Snapshot, TodayForecast, Weekday,
};
pub use station::Station;
