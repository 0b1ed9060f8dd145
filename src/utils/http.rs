// src/utils/http.rs

//! HTTP client utilities.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::{Config, SourceConfig};
use crate::utils::retry::RetryPolicy;

/// Anything that can produce the raw bulletin page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::config(format!("Invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::config(format!("Invalid value for header '{name}': {e}")))?;
        headers.insert(name, value);
    }

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch a page body, treating non-2xx statuses as failures.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

/// Fetches the bulletin page over HTTP with retries.
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            url: url.into(),
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.source)?;
        Ok(Self::new(
            client,
            config.source.url.clone(),
            RetryPolicy::from_config(&config.retry),
        ))
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        log::info!("Fetching bulletin from {}", self.url);
        self.retry
            .run(&self.url, || fetch_text(&self.client, &self.url))
            .await
    }
}
