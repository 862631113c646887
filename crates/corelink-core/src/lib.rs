#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the corelink crates.
//!
//! This crate owns the retry driver used by every request that goes through
//! a corelink session:
//!
//! - **Backoff strategies** via the [`BackoffStrategy`](retry::BackoffStrategy) trait
//!   - Exponential growth capped at a maximum interval
//!   - Optional jitter
//! - **Retry classification** via the [`Retryable`](retry::Retryable) trait, so
//!   "should this be retried" is a pure function of the error kind
//! - **Retry hooks** invoked before every re-attempt (logging, body rewinds)
//!
//! # Examples
//!
//! ```rust
//! use corelink_core::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Flaky;
//!
//! impl std::fmt::Display for Flaky {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("flaky")
//!     }
//! }
//!
//! impl Retryable for Flaky {
//!     fn is_retryable(&self) -> bool {
//!         true
//!     }
//! }
//!
//! # async fn example() {
//! let policy = RetryPolicy::new(
//!     ExponentialBackoff::builder()
//!         .max_attempts(3)
//!         .initial_delay(Duration::from_millis(10))
//!         .build(),
//! );
//!
//! let result = policy.execute(|_attempt| async { Ok::<_, Flaky>(42) }).await;
//! assert_eq!(result.unwrap(), 42);
//! # }
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use corelink_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, RetryEvent, RetryHook,
        RetryPolicy, RetryStats, Retryable,
    };
}
