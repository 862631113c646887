//! Endpoint requests
//!
//! One [`EndpointRequest`] describes one logical call: verb, path below the
//! versioned base path, headers, optional body, and how non-2xx answers are
//! treated. The session turns it into a transport request and drives it
//! through the retry loop.

use crate::error::{Error, Result};
use bytes::Bytes;
use corelink_protocol::headers::JSON_CONTENT_TYPE;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;

/// A single call against Core.
///
/// # Examples
///
/// ```
/// use corelink::EndpointRequest;
///
/// let request = EndpointRequest::get("/drivers/lights/branches/main").allow_status(404);
/// assert!(request.raises);
/// assert!(request.accepts(404));
/// ```
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    /// HTTP method
    pub method: Method,

    /// Path below `/api/{service}/{version}`, starting with `/`
    pub path: String,

    /// Query parameters
    pub query: Vec<(String, String)>,

    /// Extra headers for this call
    pub headers: HeaderMap,

    /// Request body
    pub body: Option<Bytes>,

    /// Treat non-2xx answers as failures
    pub raises: bool,

    /// Statuses returned to the caller as-is even when `raises` is set
    pub allowed_statuses: Vec<u16>,
}

impl EndpointRequest {
    /// Create a request; non-2xx answers raise by default.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            raises: true,
            allowed_statuses: Vec::new(),
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the name or value is not a valid header.
    pub fn header(mut self, key: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::InvalidRequest(format!("Invalid header value for '{}': {}", key, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set a raw JSON body
    pub fn json_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| Error::InvalidRequest(format!("Cannot serialize body: {}", e)))?;
        Ok(self.json_bytes(body))
    }

    /// Whether non-2xx answers raise
    pub fn raises(mut self, raises: bool) -> Self {
        self.raises = raises;
        self
    }

    /// Return `status` to the caller un-raised and never retry it
    pub fn allow_status(mut self, status: u16) -> Self {
        self.allowed_statuses.push(status);
        self
    }

    /// Whether `status` was declared acceptable
    pub fn accepts(&self, status: u16) -> bool {
        self.allowed_statuses.contains(&status)
    }

    /// Size of the body in bytes, 0 when absent
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }
}
