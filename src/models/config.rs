//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `source.url`.
pub const ENV_URL: &str = "CLIMA_URL";

/// Environment variable overriding `cache.path`.
pub const ENV_CACHE_FILE: &str = "CLIMA_CACHE_FILE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Bulletin page location and HTTP behavior
    #[serde(default)]
    pub source: SourceConfig,

    /// Fetch retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Last known-good snapshot location
    #[serde(default)]
    pub cache: CacheConfig,

    /// Markup landmarks the extractors look for
    #[serde(default)]
    pub markup: MarkupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `CLIMA_URL` / `CLIMA_CACHE_FILE` overrides from the environment.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var(ENV_URL).ok(),
            std::env::var(ENV_CACHE_FILE).ok(),
        );
        self
    }

    fn apply_overrides(&mut self, url: Option<String>, cache_file: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            log::debug!("Source URL overridden by {}: {}", ENV_URL, url);
            self.source.url = url;
        }
        if let Some(path) = cache_file.filter(|p| !p.trim().is_empty()) {
            log::debug!("Cache path overridden by {}: {}", ENV_CACHE_FILE, path);
            self.cache.path = PathBuf::from(path);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.cache.path.as_os_str().is_empty() {
            return Err(AppError::validation("cache.path is empty"));
        }
        if self.markup.stations_var.trim().is_empty() {
            return Err(AppError::validation("markup.stations_var is empty"));
        }
        for selector in [
            &self.markup.container_selector,
            &self.markup.title_selector,
            &self.markup.detail_selector,
        ] {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into `AppError::Selector`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Where the bulletin lives and how to ask for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            headers: BTreeMap::new(),
        }
    }
}

/// Retry settings for the fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts in seconds
    #[serde(default = "defaults::retry_delay")]
    pub delay_secs: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            delay_secs: defaults::retry_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file holding the last fresh snapshot
    #[serde(default = "defaults::cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: defaults::cache_path(),
        }
    }
}

/// Landmarks in the bulletin page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// CSS selector for the element wrapping the prose bulletin
    #[serde(default = "defaults::container_selector")]
    pub container_selector: String,

    /// CSS selector for section titles inside the container
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// CSS selector for section bodies inside the container
    #[serde(default = "defaults::detail_selector")]
    pub detail_selector: String,

    /// Name of the script-level array holding station readings
    #[serde(default = "defaults::stations_var")]
    pub stations_var: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            container_selector: defaults::container_selector(),
            title_selector: defaults::title_selector(),
            detail_selector: defaults::detail_selector(),
            stations_var: defaults::stations_var(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn url() -> String {
        "https://clima.sanluis.gob.ar/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        5
    }

    pub fn cache_path() -> PathBuf {
        PathBuf::from("data/ultimo_clima.json")
    }

    // Markup defaults
    pub fn container_selector() -> String {
        "span#ContentPlaceHolder1_spanPronosticoGeneralTexto".into()
    }
    pub fn title_selector() -> String {
        "p.PronosticoGeneralTitulo".into()
    }
    pub fn detail_selector() -> String {
        "p.PronosticoGeneralDetalle".into()
    }
    pub fn stations_var() -> String {
        "vEstaciones".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
