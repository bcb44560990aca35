// Retry with exponential backoff for model calls.
//
// Only failures that another attempt could fix are retried: network errors,
// 429 rate limiting and 5xx responses. Schema mismatches and 4xx errors are
// returned immediately. The pipeline itself never retries; this lives
// entirely behind the ModelInvoker boundary.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::InvocationError;

/// Backoff parameters for retrying a single model call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each subsequent retry.
    pub base_backoff: Duration,
    /// Cap on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Un-jittered delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Scale a delay by 0.75–1.25 so concurrent callers don't retry in lockstep.
/// Uses the clock's sub-second nanos rather than pulling in an RNG.
fn jitter(delay: Duration) -> Duration {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let factor = 0.75 + (nanos % 500) as f64 / 1000.0;
    Duration::from_secs_f64(delay.as_secs_f64() * factor)
}

/// Run `operation`, retrying retryable failures according to `policy`.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Result<T, InvocationError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, InvocationError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || attempt >= policy.max_retries {
                    return Err(err);
                }

                attempt += 1;
                let delay = jitter(policy.backoff_for(attempt));

                warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "Model call failed, retrying"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = with_retry(&fast_policy(3), || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(InvocationError::Status {
                    status: 429,
                    body: "slow down".into(),
                })
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_retry(&fast_policy(2), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(InvocationError::Transport("connection refused".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_schema_errors() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_retry(&fast_policy(5), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(InvocationError::schema("topics", "invalid JSON"))
        })
        .await;
        assert!(matches!(result, Err(InvocationError::Schema { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn none_policy_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let _: Result<(), _> = with_retry(&RetryPolicy::none(), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(InvocationError::Status {
                status: 503,
                body: String::new(),
            })
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
