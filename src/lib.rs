// src/lib.rs

//! San Luis weather bulletin scraper library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
pub use models::{Config, Snapshot};
pub use pipeline::{WeatherPipeline, get_weather};
