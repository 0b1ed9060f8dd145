// src/utils/retry.rs

//! Fixed-delay retry policy.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::RetryConfig;

/// Runs an operation up to `max_attempts` times, pausing `delay` in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A `max_attempts` of zero still makes one attempt.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Call `op` until it succeeds or attempts run out.
    ///
    /// Exhaustion yields `AppError::Network` wrapping the last failure.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts => {
                    log::warn!(
                        "{}: attempt {}/{} failed: {}. Retrying in {}s",
                        label,
                        attempt,
                        self.max_attempts,
                        error,
                        self.delay.as_secs_f32()
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(error) => {
                    log::error!(
                        "{}: all {} attempts failed. Last error: {}",
                        label,
                        self.max_attempts,
                        error
                    );
                    return Err(AppError::network(attempt, error));
                }
            }
        }
    }
}
