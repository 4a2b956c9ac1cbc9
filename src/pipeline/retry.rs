//! Per-call timeouts and bounded exponential backoff.

use crate::config::RetryConfig;
use crate::error::ServiceError;
use std::future::Future;
use std::time::Duration;

/// Run one service call under `limit`; expiry becomes a transport error
pub(crate) async fn with_timeout<T, Fut>(limit: Duration, call: Fut) -> Result<T, ServiceError>
where
    Fut: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::transport(format!(
            "call timed out after {:.1}s",
            limit.as_secs_f64()
        ))),
    }
}

/// Retry an async service call with exponential backoff
///
/// Only transport errors are retried:
/// - Transport errors: wait `retry.backoff(n)` and try again, up to `attempts` calls
/// - Anything else: returned immediately
///
/// # Arguments
/// * `operation` - Closure producing a fresh call future per attempt
/// * `attempts` - Total number of calls allowed (1 = no retry)
/// * `operation_name` - Human-readable name for logging
/// * `retry` - Backoff settings
/// * `call_timeout` - Limit applied to every individual call
pub(crate) async fn retry_with_backoff<F, T, Fut>(
    mut operation: F,
    attempts: u32,
    operation_name: &str,
    retry: &RetryConfig,
    call_timeout: Duration,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match with_timeout(call_timeout, operation()).await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{} succeeded after {} retry(ies)", operation_name, attempt - 1);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < attempts => {
                let wait = retry.backoff(attempt);
                log::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                    operation_name,
                    attempt,
                    attempts,
                    e,
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    log::error!("{} failed after {} attempt(s): {}", operation_name, attempt, e);
                } else {
                    log::error!("{} failed with unrecoverable error: {}", operation_name, e);
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            ..RetryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff(
            move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ServiceError::transport("connection reset"))
                } else {
                    Ok(7)
                }
            },
            3,
            "create",
            &fast(),
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempt_budget_is_respected() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::transport("down"))
            },
            3,
            "publish",
            &fast(),
            Duration::from_secs(5),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_conflict_is_never_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Conflict {
                    tag: "v1.0.0".to_string(),
                })
            },
            3,
            "create",
            &fast(),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Conflict { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ServiceError::Transport { .. })));
    }
}
