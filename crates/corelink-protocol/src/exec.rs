//! Execute channel payloads
//!
//! A method call on a running module is posted as a single-purpose envelope:
//!
//! ```json
//! {"__exec__": "set_level", "set_level": {"level": 3}}
//! ```
//!
//! The `__exec__` key names the method and the method name itself carries the
//! arguments. When the driver's code raises, Core answers with status 203 and
//! a [`RemoteException`] body.

use crate::error::{ProtocolError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Key naming the method inside an execute envelope
pub const EXEC_KEY: &str = "__exec__";

/// Envelope for one execute call.
///
/// # Examples
///
/// ```
/// use corelink_protocol::ExecEnvelope;
/// use serde_json::json;
///
/// let envelope = ExecEnvelope::new("set_level", json!({"level": 3})).unwrap();
/// assert_eq!(
///     serde_json::to_value(&envelope).unwrap(),
///     json!({"__exec__": "set_level", "set_level": {"level": 3}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExecEnvelope {
    method: String,
    arguments: serde_json::Value,
}

impl ExecEnvelope {
    /// Build an envelope calling `method` with `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidEnvelope`] when `method` is empty or
    /// collides with the `__exec__` key.
    pub fn new(method: impl Into<String>, arguments: serde_json::Value) -> Result<Self> {
        let method = method.into();
        if method.is_empty() {
            return Err(ProtocolError::InvalidEnvelope(
                "method name cannot be empty".to_string(),
            ));
        }
        if method == EXEC_KEY {
            return Err(ProtocolError::InvalidEnvelope(format!(
                "method name cannot be {}",
                EXEC_KEY
            )));
        }
        Ok(Self { method, arguments })
    }

    /// Method being called
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Arguments passed to the method
    pub fn arguments(&self) -> &serde_json::Value {
        &self.arguments
    }

    /// Serialize to the bytes posted on the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Serialize for ExecEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(EXEC_KEY, &self.method)?;
        map.serialize_entry(&self.method, &self.arguments)?;
        map.end()
    }
}

/// Body of a 203 answer: the driver's code raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteException {
    /// Exception message
    pub error: String,

    /// Remote stack trace, outermost frame first
    #[serde(default)]
    pub backtrace: Option<Vec<String>>,
}

impl RemoteException {
    /// Parse a 203 body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let envelope = ExecEnvelope::new("toggle", json!([1, "two"])).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();

        assert_eq!(value, json!({"__exec__": "toggle", "toggle": [1, "two"]}));
    }

    #[rstest]
    #[case("")]
    #[case("__exec__")]
    fn test_envelope_rejects_bad_method(#[case] method: &str) {
        let err = ExecEnvelope::new(method, json!(null)).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidEnvelope(_)));
    }

    #[test]
    fn test_remote_exception_with_backtrace() {
        let exc = RemoteException::from_slice(
            br#"{"error":"boom","backtrace":["driver.py:10","runner.py:3"]}"#,
        )
        .unwrap();

        assert_eq!(exc.error, "boom");
        assert_eq!(
            exc.backtrace,
            Some(vec!["driver.py:10".to_string(), "runner.py:3".to_string()])
        );
    }

    #[test]
    fn test_remote_exception_without_backtrace() {
        let exc = RemoteException::from_slice(br#"{"error":"boom"}"#).unwrap();
        assert_eq!(exc.backtrace, None);
    }

    #[test]
    fn test_remote_exception_malformed() {
        assert!(RemoteException::from_slice(b"not json").is_err());
        assert!(RemoteException::from_slice(br#"{"message":"wrong key"}"#).is_err());
    }
}
