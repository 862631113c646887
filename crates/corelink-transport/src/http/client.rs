//! HTTP transport client implementation
//!
//! Implements the Transport trait on top of a single reqwest client. One
//! `send` is exactly one request/response cycle; the body is fully buffered
//! before returning so the connection is free for the next caller.

use crate::error::Result;
use crate::traits::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::trace;

/// HTTP transport implementation
///
/// Handles:
/// - Connect, read and write bounds
/// - Connection reuse (at most one idle connection per host, matching the
///   one-in-flight-per-session model)
/// - Full response buffering
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HTTP transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        // reqwest has no write-phase bound; the whole cycle is capped at read + write.
        let client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.read_timeout + config.write_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration this transport was built with
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self
            .client
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        trace!(method = %request.method, url = %request.url, "sending request");
        let response = req.send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Bound on establishing the TCP/TLS connection
    pub connect_timeout: Duration,

    /// Bound on each read from the connection
    pub read_timeout: Duration,

    /// Bound on transmitting the request
    pub write_timeout: Duration,

    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(300),
            write_timeout: Duration::from_secs(60),
            pool_max_idle_per_host: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new().expect("Failed to create transport");
        assert_eq!(transport.config(), &HttpTransportConfig::default());
    }

    #[test]
    fn test_http_transport_with_config() {
        let config = HttpTransportConfig {
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(3),
            pool_max_idle_per_host: 4,
        };

        let transport = HttpTransport::with_config(config.clone()).expect("Failed to create transport");
        assert_eq!(transport.config(), &config);
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_retryable_error() {
        use corelink_core::retry::Retryable;

        let transport = HttpTransport::with_config(HttpTransportConfig {
            connect_timeout: Duration::from_millis(500),
            ..Default::default()
        })
        .unwrap();

        // Port 9 (discard) is closed on any sane test host.
        let err = transport
            .send(&HttpRequest::get("http://127.0.0.1:9/"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, TransportError::Connection(_) | TransportError::Timeout(_)),
            "unexpected error: {err:?}"
        );
        assert!(err.is_retryable());
    }
}
