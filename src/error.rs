// src/error.rs

//! Unified error handling for the weather pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regex compilation failed
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Every fetch attempt failed; carries the last failure.
    #[error("Network error after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: Box<AppError>,
    },

    /// Persisted snapshot could not be read or decoded
    #[error("Cache read error: {0}")]
    CacheRead(String),

    /// Snapshot could not be persisted
    #[error("Cache write error: {0}")]
    CacheWrite(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap the last failure of an exhausted retry loop.
    pub fn network(attempts: u32, last: AppError) -> Self {
        Self::Network {
            attempts,
            source: Box::new(last),
        }
    }

    pub fn cache_read(message: impl fmt::Display) -> Self {
        Self::CacheRead(message.to_string())
    }

    pub fn cache_write(message: impl fmt::Display) -> Self {
        Self::CacheWrite(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_message_includes_last_failure() {
        let err = AppError::network(3, AppError::config("boom"));
        let msg = err.to_string();
        assert!(msg.contains("3 attempt(s)"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_cache_errors_carry_message() {
        assert_eq!(
            AppError::cache_read("corrupt").to_string(),
            "Cache read error: corrupt"
        );
        assert!(matches!(AppError::cache_write("denied"), AppError::CacheWrite(_)));
    }
}
