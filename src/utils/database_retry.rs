use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use crate::{AppError, Result};

/// Configuration for database operation retries
#[derive(Debug, Clone)]
pub struct DatabaseRetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Fraction of the delay applied as random jitter in either direction.
    pub jitter: f64,
}

impl Default for DatabaseRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl DatabaseRetryConfig {
    /// Backoff after `delay_ms`, before jitter: multiplied and capped.
    pub fn next_delay_ms(&self, delay_ms: u64) -> u64 {
        (((delay_ms as f64) * self.backoff_multiplier) as u64).min(self.max_delay_ms)
    }

    /// Total attempts made; the operation always runs at least once.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    fn with_jitter(&self, delay_ms: u64) -> u64 {
        if self.jitter <= 0.0 {
            return delay_ms;
        }
        let factor = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        ((delay_ms as f64) * (1.0 + factor)).max(10.0) as u64
    }
}

/// Retry a database operation with exponential backoff.
///
/// Only `DatabaseError`s are retried; any other error is returned at once.
pub async fn retry_database_operation<F, Fut, T>(
    operation: F,
    config: DatabaseRetryConfig,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = config.initial_delay_ms;
    let mut last_error = AppError::DatabaseError("Operation failed".to_string());
    let attempts = config.attempts();

    for attempt in 1..=attempts {
        tracing::debug!("🔄 DATABASE_RETRY: Attempt {}/{}", attempt, attempts);

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!("✅ DATABASE_RETRY: Operation succeeded on attempt {}", attempt);
                }
                return Ok(result);
            }
            Err(e @ AppError::DatabaseError(_)) => {
                last_error = e;

                if attempt < attempts {
                    let wait = config.with_jitter(delay);
                    tracing::warn!("⚠️ DATABASE_RETRY: Attempt {} failed: {}, retrying in {}ms",
                                  attempt, last_error, wait);
                    sleep(Duration::from_millis(wait)).await;
                    delay = config.next_delay_ms(delay);
                }
            }
            Err(e) => return Err(e),
        }
    }

    tracing::error!("❌ DATABASE_RETRY: All {} attempts failed, last error: {}",
                   attempts, last_error);
    Err(last_error)
}

/// Convenience function for operations that might need retrying
pub async fn with_database_retry<F, Fut, T>(operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    retry_database_operation(operation, DatabaseRetryConfig::default()).await
}
