//! Retry strategies and the retry driver.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - how long to wait between attempts, and how many attempts
//! - [`ExponentialBackoff`] - exponential growth with jitter, capped at `max_delay`
//! - [`Retryable`] - classification predicate implemented by error types
//! - [`RetryPolicy`] - the driver: attempt, classify, hook, sleep, repeat
//!
//! Exhaustion always propagates the last observed error; there is no
//! synthetic "retries exhausted" error.

mod exponential;
mod policy;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use policy::{RetryEvent, RetryHook, RetryPolicy, RetryStats};
pub use strategy::{BackoffStrategy, Retryable};
