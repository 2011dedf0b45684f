//! Async retry executor.

use std::fmt::Display;
use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::RetryError;
use super::policy::RetryPolicy;

/// Runs async operations under a [`RetryPolicy`].
///
/// The executor holds no shared mutable state. Clones are independent and
/// any number of them may run concurrently.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    cancel: Option<CancellationToken>,
}

impl RetryExecutor {
    /// Creates an executor for the given policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    /// Observes `token` before each attempt, during each attempt, and during
    /// each backoff sleep.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the cancellation token, if one is attached.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Returns the policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Executes `f`, retrying every failure until the attempt budget is spent.
    pub async fn execute<F, Fut, T, E>(&self, operation_name: &str, f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_while(operation_name, |_| true, f).await
    }

    /// Executes `f`, retrying failures for which `should_retry` returns `true`.
    ///
    /// An error rejected by `should_retry` is returned at once as
    /// [`RetryError::Rejected`].
    pub async fn execute_while<F, Fut, T, E, P>(
        &self,
        operation_name: &str,
        should_retry: P,
        mut f: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            if self.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            attempt += 1;

            let outcome = match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        return Err(RetryError::Cancelled { attempts: attempt - 1 });
                    }
                    outcome = f() => outcome,
                },
                None => f().await,
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            operation = operation_name,
                            attempt, "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !should_retry(&error) {
                debug!(
                    operation = operation_name,
                    attempt,
                    error = %error,
                    "Error classified as permanent, not retrying"
                );
                return Err(RetryError::Rejected { error, attempt });
            }

            if attempt >= max_attempts {
                warn!(
                    operation = operation_name,
                    attempts = attempt,
                    error = %error,
                    "Max retries exceeded"
                );
                return Err(RetryError::Exhausted {
                    last_error: error,
                    attempts: attempt,
                    max_attempts,
                });
            }

            let delay = self.policy.delay_with_jitter(attempt, &mut rand::rng());
            debug!(
                operation = operation_name,
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "Attempt failed, retrying"
            );

            match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        return Err(RetryError::Cancelled { attempts: attempt });
                    }
                    () = tokio::time::sleep(delay) => {}
                },
                None => tokio::time::sleep(delay).await,
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO, 2)
    }

    #[tokio::test]
    async fn test_execute_succeeds_first_try() {
        let executor = RetryExecutor::new(fast_policy(3));
        let result = executor
            .execute("test_op", || async { Ok::<_, String>(42) })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_execute_succeeds_after_retries() {
        let executor = RetryExecutor::new(fast_policy(5));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = executor
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("connection reset".to_string())
                    } else {
                        Ok(99)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 99);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_exhausts_after_max_attempts() {
        let executor = RetryExecutor::new(fast_policy(4));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = executor
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(format!("failure {n}"))
                }
            })
            .await;

        match result {
            Err(RetryError::Exhausted {
                last_error,
                attempts,
                max_attempts,
            }) => {
                assert_eq!(attempts, 4);
                assert_eq!(max_attempts, 4);
                assert_eq!(last_error, "failure 4");
            }
            other => panic!("Expected Exhausted, got: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let executor = RetryExecutor::new(RetryPolicy::no_retry());
        let result: Result<(), _> = executor
            .execute("test_op", || async { Err("boom".to_string()) })
            .await;
        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 1, max_attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_execute_while_rejects_permanent_error() {
        let executor = RetryExecutor::new(fast_policy(5));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = executor
            .execute_while(
                "test_op",
                |e: &String| e != "permanent",
                move || {
                    let counter = counter_clone.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err("permanent".to_string())
                    }
                },
            )
            .await;

        assert!(matches!(result, Err(RetryError::Rejected { attempt: 1, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(30), 2);
        let executor = RetryExecutor::new(policy);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = executor
            .execute("test_op", || async { Err("timeout".to_string()) })
            .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
        // 1s + 2s of backoff, each with up to 10% jitter
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3300));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let token = CancellationToken::new();
        token.cancel();
        let executor = RetryExecutor::new(fast_policy(3)).with_cancellation(token);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), RetryError<String>> = executor
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 0 })));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_backoff() {
        let token = CancellationToken::new();
        let policy = RetryPolicy::new(5, Duration::from_secs(60), Duration::from_secs(60), 2);
        let executor = RetryExecutor::new(policy).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            token.cancel();
        });

        let result: Result<(), _> = executor
            .execute("test_op", || async { Err("503".to_string()) })
            .await;

        canceller.await.unwrap();
        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 1 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_attempt() {
        let token = CancellationToken::new();
        let executor = RetryExecutor::new(fast_policy(3)).with_cancellation(token.clone());
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            token.cancel();
        });

        let result: Result<(), RetryError<String>> = executor
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::future::pending::<Result<(), String>>().await
                }
            })
            .await;

        canceller.await.unwrap();
        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 0 })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_into_inner_and_attempts() {
        let exhausted: RetryError<&str> = RetryError::Exhausted {
            last_error: "last",
            attempts: 5,
            max_attempts: 5,
        };
        assert_eq!(exhausted.attempts(), 5);
        assert_eq!(exhausted.into_inner(), Some("last"));

        let cancelled: RetryError<&str> = RetryError::Cancelled { attempts: 2 };
        assert_eq!(cancelled.attempts(), 2);
        assert_eq!(cancelled.into_inner(), None);
    }
}
