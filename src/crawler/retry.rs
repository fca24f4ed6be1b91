//! Bounded retry with a fixed backoff
//!
//! Kept separate from the operations it wraps so the attempt budget and the
//! backoff can be configured and tested on their own.

use crate::config::EnrichmentConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least one attempt
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Builds the geolocation retry policy from configuration
    pub fn from_config(config: &EnrichmentConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.backoff))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Runs `operation` until it succeeds or the attempt budget is spent
    ///
    /// The operation receives the 1-based attempt number. Failed attempts are
    /// logged and followed by the backoff pause; no pause follows the last one.
    ///
    /// # Returns
    ///
    /// The first success, or the error of the final attempt.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        label,
                        attempt,
                        self.max_attempts,
                        e,
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}, giving up",
                        label,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> = policy
            .run("op", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("done") }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_later_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let result: Result<u32, String> = policy
            .run("op", |attempt| async move {
                if attempt < 3 {
                    Err(format!("flaky {}", attempt))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run("op", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("attempt {}", attempt)) }
            })
            .await;

        assert_eq!(result, Err("attempt 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_backoff_only_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(40));
        let start = Instant::now();

        let _: Result<(), &str> = policy.run("op", |_| async { Err("nope") }).await;

        let elapsed = start.elapsed();
        // Two pauses for three attempts
        assert!(elapsed >= Duration::from_millis(80), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(600), "{:?}", elapsed);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_from_config() {
        let policy = RetryPolicy::from_config(&EnrichmentConfig::default());
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(), Duration::from_secs(1));
    }
}
