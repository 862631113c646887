//! Common test utilities and helpers

use corelink::{Client, ClientConfig, RetrySettings};
use std::time::Duration;
use wiremock::MockServer;

/// Base path every endpoint lives under with the default configuration
#[allow(dead_code)]
pub const BASE: &str = "/api/core/v1";

/// Full mock path for an endpoint path
#[allow(dead_code)]
pub fn api(path: &str) -> String {
    format!("{}{}", BASE, path)
}

/// Retry settings with millisecond delays so tests stay fast
#[allow(dead_code)]
pub fn fast_retry(max_attempts: u32) -> RetrySettings {
    RetrySettings {
        max_attempts,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        ..Default::default()
    }
}

/// Configuration pointing at a mock server
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        retry: fast_retry(3),
        ..ClientConfig::with_uri(server.uri())
    }
}

/// Client pointing at a mock server, three attempts per request
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> Client {
    Client::new(config_for(server)).expect("Failed to build client")
}
