//! Exponential backoff with jitter.

use super::strategy::BackoffStrategy;
use std::time::Duration;

/// Exponential backoff strategy with configurable jitter.
///
/// Delays between attempts grow as `initial_delay * multiplier^attempt` and are
/// capped at `max_delay`. Jitter is applied before the cap, so the cap holds
/// for every delay this strategy produces.
///
/// # Mathematical Formula
///
/// For attempt `n` (0-indexed, after the `n`-th failure):
/// ```text
/// base_delay   = initial_delay * (multiplier ^ n)
/// jittered     = base_delay + base_delay * jitter * random(-1.0, +1.0)
/// final_delay  = min(jittered, max_delay)
/// ```
///
/// # Examples
///
/// ```rust
/// use corelink_core::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// // Defaults: 3 attempts, 500ms initial, 10s cap, x2, 10% jitter
/// let backoff = ExponentialBackoff::default();
///
/// let backoff = ExponentialBackoff::builder()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .multiplier(2.0)
///     .jitter(0.1)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// A strategy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::builder().max_attempts(1).build()
    }

    /// The configured upper bound for a single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// The configured delay before the first re-attempt (before jitter).
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `max_attempts`: 3
    /// - `initial_delay`: 500ms
    /// - `max_delay`: 10s
    /// - `multiplier`: 2.0
    /// - `jitter`: 0.1
    fn default() -> Self {
        ExponentialBackoffBuilder::default().build()
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);

        let jittered = if self.jitter > 0.0 {
            let jitter_amount = base_delay * self.jitter * (rand::random::<f64>() - 0.5) * 2.0;
            base_delay + jitter_amount
        } else {
            base_delay
        };

        // powi can overflow to infinity for large attempts; min() handles it.
        // Near Duration::MAX the f64 round-trip overflows; fall back to the cap itself.
        let capped = jittered.min(self.max_delay.as_secs_f64()).max(0.0);
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Builder for configuring [`ExponentialBackoff`].
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    max_attempts: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
}

impl ExponentialBackoffBuilder {
    /// Set the total number of attempts, including the first.
    ///
    /// Values below 1 are raised to 1. Default: 3
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Set the delay before the first re-attempt.
    ///
    /// Default: 500ms
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the maximum delay between attempts.
    ///
    /// Default: 10s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier. Values below 1.0 are raised to 1.0.
    ///
    /// Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier.max(1.0));
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    ///
    /// A jitter of 0.1 lets each delay vary by ±10% before the cap is applied.
    ///
    /// Default: 0.1
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Build the `ExponentialBackoff` instance, using defaults for unset values.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            max_attempts: self.max_attempts.unwrap_or(3),
            initial_delay: self.initial_delay.unwrap_or(Duration::from_millis(500)),
            max_delay: self.max_delay.unwrap_or(Duration::from_secs(10)),
            multiplier: self.multiplier.unwrap_or(2.0),
            jitter: self.jitter.unwrap_or(0.1),
        }
    }
}
