//! The retry driver.

use super::exponential::ExponentialBackoff;
use super::strategy::{BackoffStrategy, Retryable};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Details handed to a [`RetryHook`] before a re-attempt.
#[derive(Clone, Copy)]
pub struct RetryEvent<'a> {
    /// The error that failed the attempt.
    pub error: &'a dyn fmt::Display,
    /// 0-indexed attempt that just failed.
    pub attempt: u32,
    /// Time since the first attempt started.
    pub elapsed: Duration,
    /// How long the driver will sleep before the next attempt.
    pub next_delay: Duration,
}

impl fmt::Debug for RetryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEvent")
            .field("error", &format_args!("{}", self.error))
            .field("attempt", &self.attempt)
            .field("elapsed", &self.elapsed)
            .field("next_delay", &self.next_delay)
            .finish()
    }
}

/// Callback invoked after a retryable failure, before the backoff sleep.
pub type RetryHook = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;

/// Summary of one driven operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStats {
    /// Number of attempts made, including the first.
    pub attempts: u32,
    /// Wall time across all attempts and sleeps.
    pub elapsed: Duration,
}

impl RetryStats {
    /// Number of re-attempts after the first.
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Drives an operation through bounded retries.
///
/// On each failure the error is classified with [`Retryable::is_retryable`].
/// Terminal errors propagate immediately. Retryable errors trigger the
/// `on_retry` hook and a backoff sleep, unless attempts are exhausted, in which
/// case the last error propagates unchanged.
///
/// # Examples
///
/// ```rust
/// use corelink_core::retry::{ExponentialBackoff, RetryPolicy, Retryable};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct Transient;
///
/// impl std::fmt::Display for Transient {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("transient")
///     }
/// }
///
/// impl Retryable for Transient {
///     fn is_retryable(&self) -> bool {
///         true
///     }
/// }
///
/// # async fn example() {
/// let policy = RetryPolicy::new(
///     ExponentialBackoff::builder()
///         .max_attempts(3)
///         .initial_delay(Duration::from_millis(1))
///         .build(),
/// );
///
/// let calls = AtomicU32::new(0);
/// let result = policy
///     .execute(|attempt| {
///         calls.fetch_add(1, Ordering::SeqCst);
///         async move { if attempt < 2 { Err(Transient) } else { Ok(attempt) } }
///     })
///     .await;
///
/// assert_eq!(result.unwrap(), 2);
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    backoff: ExponentialBackoff,
    on_retry: Option<RetryHook>,
}

impl RetryPolicy {
    /// Create a policy from a backoff strategy, with no hook.
    pub fn new(backoff: ExponentialBackoff) -> Self {
        Self {
            backoff,
            on_retry: None,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(ExponentialBackoff::no_retry())
    }

    /// Install a hook called before every re-attempt.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    /// Install a shared hook called before every re-attempt.
    pub fn with_shared_hook(mut self, hook: RetryHook) -> Self {
        self.on_retry = Some(hook);
        self
    }

    /// The backoff strategy in use.
    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.backoff.max_attempts()
    }

    /// Drive `operation` until it succeeds, fails terminally, or runs out of attempts.
    ///
    /// `operation` receives the 0-indexed attempt number.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        self.execute_with_stats(operation).await.0
    }

    /// Like [`execute`](Self::execute), also reporting how many attempts were made.
    pub async fn execute_with_stats<F, Fut, T, E>(
        &self,
        mut operation: F,
    ) -> (Result<T, E>, RetryStats)
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let started = Instant::now();
        let max_attempts = self.backoff.max_attempts();
        let mut attempt = 0;

        loop {
            let result = operation(attempt).await;
            let stats = RetryStats {
                attempts: attempt + 1,
                elapsed: started.elapsed(),
            };

            let err = match result {
                Ok(value) => return (Ok(value), stats),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt + 1 >= max_attempts {
                return (Err(err), stats);
            }

            let delay = self.backoff.next_delay(attempt);
            {
                let event = RetryEvent {
                    error: &err,
                    attempt,
                    elapsed: stats.elapsed,
                    next_delay: delay,
                };
                // An installed hook owns reporting of the retry
                match &self.on_retry {
                    Some(hook) => hook(&event),
                    None => log_retry(&event),
                }
            }

            drop(err);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}

#[cfg(feature = "tracing")]
fn log_retry(event: &RetryEvent<'_>) {
    tracing::debug!(
        attempt = event.attempt,
        delay_ms = event.next_delay.as_millis() as u64,
        error = %event.error,
        "retrying after failure"
    );
}

#[cfg(not(feature = "tracing"))]
fn log_retry(_event: &RetryEvent<'_>) {}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(ExponentialBackoff::default())
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("backoff", &self.backoff)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}
