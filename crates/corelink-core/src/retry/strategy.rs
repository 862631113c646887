//! Backoff and classification traits.

use std::time::Duration;

/// A strategy deciding how many attempts a call gets and how long to wait
/// between them.
///
/// Implementations are read-only configuration: one instance is shared by
/// every call made through a session.
///
/// # Examples
///
/// ```rust
/// use corelink_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_attempts(4)
///     .initial_delay(Duration::from_millis(100))
///     .jitter(0.0)
///     .build();
///
/// assert_eq!(backoff.max_attempts(), 4);
/// assert_eq!(backoff.next_delay(1), Duration::from_millis(200));
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Delay to wait before re-attempting after the failure of attempt `attempt`.
    ///
    /// `attempt` is 0-indexed: `next_delay(0)` is the wait between the first
    /// and the second attempt. The result never exceeds the strategy's cap.
    fn next_delay(&self, attempt: u32) -> Duration;

    /// Total number of attempts, including the first one. Always at least 1.
    fn max_attempts(&self) -> u32;
}

/// Classification predicate consulted by [`RetryPolicy`](super::RetryPolicy)
/// after every failed attempt.
///
/// The decision must depend only on the error value itself. Transient I/O
/// failures are typically retryable; application-level failures (validation
/// errors, remote exceptions, statuses the caller declared meaningful) are not.
pub trait Retryable {
    /// Returns `true` if the failed operation may be attempted again.
    fn is_retryable(&self) -> bool;
}

impl Retryable for std::io::Error {
    fn is_retryable(&self) -> bool {
        use std::io::ErrorKind;

        matches!(
            self.kind(),
            ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected
                | ErrorKind::BrokenPipe
                | ErrorKind::TimedOut
                | ErrorKind::Interrupted
                | ErrorKind::UnexpectedEof
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_classification() {
        assert!(Error::from(ErrorKind::ConnectionReset).is_retryable());
        assert!(Error::from(ErrorKind::TimedOut).is_retryable());
        assert!(!Error::from(ErrorKind::PermissionDenied).is_retryable());
        assert!(!Error::from(ErrorKind::InvalidData).is_retryable());
    }
}
