//! Transport trait and the raw request/response values it moves.

use crate::error::{Result, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// A fully resolved HTTP request.
///
/// The body is held as immutable [`Bytes`], so re-sending the same request
/// after a failed attempt transmits identical bytes from the start.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,

    /// Absolute request URL
    pub url: String,

    /// Request headers
    pub headers: HeaderMap,

    /// Request body (optional)
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add a header to the request
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the name or value is not a valid header.
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid header name '{}': {}", key, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid header value for '{}': {}", key, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the request body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Size of the body in bytes, 0 when absent
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }
}

/// HTTP response as received from Core, with the body fully buffered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse response body as JSON
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the body does not match `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One request/response cycle against Core.
///
/// Implementations are not assumed to be safe for concurrent multiplexed use;
/// callers go through a [`ConnectionGuard`](crate::ConnectionGuard) so that at
/// most one cycle is in flight per session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and buffer the full response
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// Tear down the underlying connection
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
