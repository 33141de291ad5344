//! Retry utilities with exponential backoff
//!
//! Outbound LLM calls go through [`retry_with_backoff`] so that every judgment
//! shares one bounded retry policy instead of ad hoc nested fallbacks.

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const LOG_TARGET: &str = "util::retry";

/// Configuration for retry behavior
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Random spread applied to each delay, as a fraction of it (0.0 disables)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: 0.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Default::default()
        }
    }

    /// Calculate the delay for a given attempt number
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32 - 1);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let spread = self.jitter.min(1.0);
        let factor = rand::rng().random_range((1.0 - spread)..=(1.0 + spread));
        delay.mul_f64(factor).min(self.max_delay)
    }
}

/// Retry a function with exponential backoff
///
/// Returns the first success, or the last error once attempts are exhausted or
/// `is_retryable` rejects an error.
pub async fn retry_with_backoff<F, T, E, Fut>(
    config: &RetryConfig,
    mut f: F,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(target: LOG_TARGET, attempt, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt >= max_attempts || !is_retryable(&e) {
                    return Err(e);
                }
                let delay = config.jittered(config.delay_for_attempt(attempt));
                warn!(
                    target: LOG_TARGET,
                    "Operation failed on attempt {}/{}, retrying after {:?}",
                    attempt, max_attempts, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Check if an HTTP error is retryable
pub fn is_http_retryable(status: u16) -> bool {
    // Retry on server errors (5xx) and certain client errors
    matches!(status, 408 | 429 | 500..=599)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retry_config_delay_calculation() {
        let config = RetryConfig::new(5, Duration::from_millis(100));

        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(800));
    }

    #[test]
    fn test_retry_config_max_delay() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 10.0,
            max_delay: Duration::from_secs(1),
            jitter: 0.0,
        };

        // Should be capped at max_delay
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_spread() {
        let config = RetryConfig {
            jitter: 0.2,
            ..RetryConfig::new(3, Duration::from_millis(1000))
        };
        for _ in 0..50 {
            let d = config.jittered(Duration::from_millis(1000));
            assert!(d >= Duration::from_millis(800) && d <= Duration::from_millis(1200));
        }
    }

    #[test]
    fn test_is_http_retryable() {
        assert!(is_http_retryable(500));
        assert!(is_http_retryable(503));
        assert!(is_http_retryable(429)); // Too Many Requests
        assert!(is_http_retryable(408)); // Request Timeout
        assert!(!is_http_retryable(400)); // Bad Request
        assert!(!is_http_retryable(401)); // Unauthorized
        assert!(!is_http_retryable(404)); // Not Found
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::new(3, Duration::from_millis(10));
        let result: Result<u32, &str> = retry_with_backoff(
            &config,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("transient")
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_non_retryable_error() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::new(5, Duration::from_millis(10));
        let result: Result<(), &str> = retry_with_backoff(
            &config,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
            |e| *e != "fatal",
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_when_attempts_exhausted() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::new(2, Duration::from_millis(10));
        let result: Result<(), u32> = retry_with_backoff(
            &config,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(n) }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Err(2));
    }
}
