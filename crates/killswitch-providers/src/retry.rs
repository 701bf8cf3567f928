//! Retry with per-attempt timeout and jittered exponential backoff.
//!
//! One policy is applied uniformly at the collaborator boundary; provider
//! clients never hand-roll their own retry loops.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first (1 = no retries).
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds).
    pub base_delay_ms: u64,
    /// Upper bound on any single delay (milliseconds).
    pub max_delay_ms: u64,
    /// Fraction of the delay randomised in either direction (0.0–1.0).
    pub jitter: f64,
    /// Wall-clock limit for a single attempt (milliseconds).
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            jitter: 0.2,
            attempt_timeout_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Run once, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    /// Backoff before retry number `attempt` (1-based), with jitter applied.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay_for(attempt).as_millis() as f64;
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || base == 0.0 {
            return Duration::from_millis(base as u64);
        }
        let factor = rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter));
        Duration::from_millis((base * factor).round() as u64)
    }

    /// Run `op` under this policy.
    ///
    /// Each attempt is bounded by `attempt_timeout_ms`. Non-retryable errors are
    /// returned immediately; once attempts run out the last error is wrapped in
    /// [`ProviderError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let timeout = Duration::from_millis(self.attempt_timeout_ms);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let err = match tokio::time::timeout(timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => err,
                Err(_elapsed) => ProviderError::Timeout {
                    elapsed_ms: self.attempt_timeout_ms,
                },
            };

            if !err.is_retryable() {
                return Err(err);
            }
            debug!(operation, attempt, error = %err, "attempt failed");
            last_error = Some(err);

            if attempt < max_attempts {
                tokio::time::sleep(self.delay_for(attempt)).await;
            }
        }

        Err(ProviderError::RetriesExhausted {
            operation: operation.to_string(),
            attempts: max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay_ms: 10,
            max_delay_ms: 1_000,
            jitter: 0.0,
            attempt_timeout_ms: 100,
        }
    }

    fn unavailable() -> ProviderError {
        ProviderError::Status {
            service: "test",
            status: 503,
            body: "unavailable".into(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 2_000);
        assert_eq!(policy.attempt_timeout_ms, 30_000);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8_000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(30_000));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy {
            base_delay_ms: 1_000,
            jitter: 0.25,
            ..RetryPolicy::default()
        };
        for _ in 0..50 {
            let ms = policy.delay_for(1).as_millis();
            assert!((750..=1_250).contains(&ms), "delay {ms}ms out of range");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run("search", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(42)
                }
            })
            .await
            .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_wraps_last_error() {
        let calls = AtomicU32::new(0);
        let err = fast_policy(2)
            .run("search", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(unavailable())
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match err {
            ProviderError::RetriesExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("503"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let err = fast_policy(5)
            .run("search", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ProviderError::MissingCredential("SERPER_API_KEY"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_times_out() {
        let err = fast_policy(1)
            .run("search", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ProviderError>(())
            })
            .await
            .unwrap_err();
        match err {
            ProviderError::RetriesExhausted { last_error, .. } => {
                assert!(last_error.contains("timed out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
