//! Retry with exponential backoff for remote fetches

use crate::error::{DashboardError, Result};
use std::future::Future;
use std::time::Duration;

/// How many times a fetch is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed attempt `attempt` (0-based): `base * 2^attempt`, saturating
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Run `op` until it succeeds, fails with a permanent error, or attempts run out
    pub async fn run<T, F, Fut>(&self, resource: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && attempt + 1 < self.max_attempts => {
                    let backoff = self.backoff(attempt);
                    tracing::warn!(resource, attempt, ?backoff, "fetch failed, retrying: {e}");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Client errors will not go away on retry
fn is_retryable(error: &DashboardError) -> bool {
    !matches!(error, DashboardError::HttpStatus { status, .. } if (400..500).contains(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn timeout() -> DashboardError {
        DashboardError::YahooFinance {
            symbol: "AAPL".to_string(),
            reason: "timed out".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(32), Duration::from_secs(u64::from(u32::MAX)));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let err = policy
            .run("AAPL", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(timeout())
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.to_string(), "Error fetching data for AAPL: timed out");
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let value = policy
            .run("news", || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err(DashboardError::HttpStatus {
                        url: "https://example.com".to_string(),
                        status: 503,
                    }),
                    _ => Ok("<html></html>"),
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "<html></html>");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let err = policy
            .run("news", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(DashboardError::HttpStatus {
                    url: "https://example.com/missing".to_string(),
                    status: 404,
                })
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, DashboardError::HttpStatus { status: 404, .. }));
    }
}
