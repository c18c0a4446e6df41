//! Caller-level retry on top of single-attempt runs
//!
//! The pipeline never retries by itself; callers that want to opt in wrap
//! their run with [`retry_with_backoff`].

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::errors::ExtractError;

/// How many extra attempts to make and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub base_delay: Duration,
    /// Upper bound of the random delay added to every wait
    pub max_jitter: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (zero-based)
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(retry));
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..jitter_ms)
        };
        backoff + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

/// Retry `f` with exponential backoff while it fails with a retryable error.
///
/// Only [`ExtractError::is_retryable`] failures (navigation problems and run
/// timeouts) are retried; everything else is returned at once.
pub async fn retry_with_backoff<F, Fut, T>(f: F, policy: RetryPolicy) -> Result<T, ExtractError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ExtractError>>,
{
    let mut retries = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }
                if retries >= policy.max_retries {
                    if policy.max_retries > 0 {
                        warn!("Max retries ({}) exceeded: {e}", policy.max_retries);
                    }
                    return Err(e);
                }

                let delay = policy.delay_for(retries);
                warn!(
                    "Retryable error, attempt {}/{}, retrying in {}ms: {e}",
                    retries + 1,
                    policy.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
        }
    }
}
