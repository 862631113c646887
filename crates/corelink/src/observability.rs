//! Centralized observability utilities for structured logging
//!
//! Every request through the session and every debug stream is logged through
//! this layer, so field names stay consistent across the crate.

use corelink_core::retry::{RetryEvent, RetryHook};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path below the versioned base path
    pub path: String,
    /// Correlation id sent with the request
    pub request_id: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            request_id: request_id.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log one attempt being sent
    pub fn log_attempt(&self, attempt: u32) {
        debug!(
            method = %self.method,
            path = %self.path,
            request_id = %self.request_id,
            body_size = self.body_size,
            attempt,
            "Sending request to Core"
        );
    }
}

/// Response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// Transport status, when Core answered
    pub status: Option<u16>,
    /// Time elapsed across all attempts
    pub elapsed: Duration,
    /// Number of retries taken (if any)
    pub retries: u32,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: Option<u16>, elapsed: Duration) -> Self {
        Self {
            status,
            elapsed,
            retries: 0,
        }
    }

    /// Set the number of retries
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Log a completed request
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            request_id = %request.request_id,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            retries = self.retries,
            "Core request completed"
        );
    }

    /// Log a failed request
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            path = %request.path,
            request_id = %request.request_id,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            error = %error,
            retries = self.retries,
            "Core request failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Retry hook that logs every retryable failure at `warn`.
pub fn retry_logger() -> RetryHook {
    Arc::new(log_retry)
}

fn log_retry(event: &RetryEvent<'_>) {
    warn!(
        error = %event.error,
        attempt = event.attempt,
        elapsed_ms = event.elapsed.as_millis() as u64,
        next_delay_ms = event.next_delay.as_millis() as u64,
        "Retrying Core request"
    );
}

/// Debug stream logging context
#[derive(Debug)]
pub struct StreamContext {
    module_id: String,
    started: Instant,
    /// Total lines delivered
    pub line_count: u64,
}

impl StreamContext {
    /// Create a context for the stream of `module_id`
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            started: Instant::now(),
            line_count: 0,
        }
    }

    /// Log stream opened
    pub fn log_opened(&self, url: &str) {
        debug!(module_id = %self.module_id, url = %url, "Debug stream opened");
    }

    /// Count one delivered line
    pub fn record_line(&mut self) {
        self.line_count += 1;
    }

    /// Log stream ended
    pub fn log_closed(&self, reason: &str) {
        info!(
            module_id = %self.module_id,
            lines = self.line_count,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            reason = %reason,
            "Debug stream ended"
        );
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `corelink=info`).
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("corelink=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metadata_creation() {
        let metadata = RequestMetadata::new("POST", "/modules", "req-1").with_body_size(12);
        assert_eq!(metadata.method, "POST");
        assert_eq!(metadata.path, "/modules");
        assert_eq!(metadata.request_id, "req-1");
        assert_eq!(metadata.body_size, Some(12));
        metadata.log_attempt(0);
    }

    #[test]
    fn test_response_metadata_with_retries() {
        let metadata = ResponseMetadata::new(Some(200), Duration::from_millis(5)).with_retries(2);
        assert_eq!(metadata.retries, 2);
        assert_eq!(metadata.status, Some(200));
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_retry_logger_accepts_events() {
        let hook = retry_logger();
        let error = "connection refused";
        hook(&RetryEvent {
            error: &error,
            attempt: 0,
            elapsed: Duration::from_millis(3),
            next_delay: Duration::from_millis(500),
        });
    }

    #[test]
    fn test_stream_context_counts_lines() {
        let mut ctx = StreamContext::new("m-1");
        ctx.record_line();
        ctx.record_line();
        assert_eq!(ctx.line_count, 2);
        ctx.log_closed("remote closed");
    }
}
