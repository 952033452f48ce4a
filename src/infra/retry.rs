use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Outcome of a single failed attempt.
#[derive(Debug)]
pub enum Failure {
    /// Worth another attempt: connection trouble, throttling, server errors.
    Transient(String),
    Permanent(AppError),
}

/// Bounded exponential backoff with jitter for idempotent reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff);
        let half_ms = (base.as_millis() / 2) as u64;
        let jitter = if half_ms == 0 {
            0
        } else {
            rand::random_range(0..half_ms)
        };
        base + Duration::from_millis(jitter)
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Failure>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(Failure::Permanent(err)) => return Err(err),
                Err(Failure::Transient(message)) => {
                    if attempt + 1 < attempts {
                        let delay = self.backoff_for(attempt);
                        tracing::warn!(
                            operation = label,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %message,
                            "transient failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = message;
                }
            }
        }

        Err(AppError::TransientQuery(format!(
            "{label} failed after {attempts} attempts: {last_error}"
        )))
    }
}
