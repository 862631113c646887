//! Response decoder
//!
//! Turns a raw response into either a typed value or a classified error. A
//! non-2xx answer to a strictly checked request becomes an
//! [`ApiResponse`](crate::ClientErrorKind::ApiResponse) error; anything else is
//! decoded as-is. A body that does not match the target shape is a local
//! [`Error::Decode`], never a remote failure.

use crate::error::{ClientError, Error, Result};
use corelink_transport::HttpResponse;
use serde::de::DeserializeOwned;

/// Apply the status check of one request.
///
/// Returns the response untouched when it is 2xx, when `raises` is false, or
/// when its status is listed in `allowed`.
pub fn check(
    response: HttpResponse,
    path: &str,
    raises: bool,
    allowed: &[u16],
) -> Result<HttpResponse> {
    if response.is_success() || !raises || allowed.contains(&response.status) {
        Ok(response)
    } else {
        Err(ClientError::api_response(&response, path).into())
    }
}

/// Decode the body of `response` into `T`.
///
/// # Errors
///
/// - [`Error::Client`] if the response is non-2xx and `raises` is set
/// - [`Error::Decode`] if the body does not deserialize into `T`
pub fn decode<T: DeserializeOwned>(response: &HttpResponse, path: &str, raises: bool) -> Result<T> {
    if raises && !response.is_success() {
        return Err(ClientError::api_response(response, path).into());
    }
    serde_json::from_slice(&response.body).map_err(|source| Error::Decode {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientErrorKind;
    use http::HeaderMap;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    fn response(status: u16, body: &'static str) -> HttpResponse {
        HttpResponse::new(status, HeaderMap::new(), body)
    }

    #[test]
    fn test_decode_success() {
        let item: Item = decode(&response(200, r#"{"id":7}"#), "/items/7", true).unwrap();
        assert_eq!(item, Item { id: 7 });
    }

    #[test]
    fn test_decode_raises_on_failure() {
        let err = decode::<Item>(&response(500, "error"), "/items", true).unwrap_err();
        let client = err.as_client_error().unwrap();
        assert_eq!(client.kind, ClientErrorKind::ApiResponse);
        assert_eq!(client.message, "request to /items failed with error");
    }

    #[test]
    fn test_decode_without_raises_parses_failure_body() {
        let item: Item = decode(&response(409, r#"{"id":1}"#), "/items", false).unwrap();
        assert_eq!(item.id, 1);
    }

    #[test]
    fn test_malformed_body_is_local_error() {
        let err = decode::<Item>(&response(200, "not json"), "/items", true).unwrap_err();
        assert!(matches!(err, Error::Decode { ref path, .. } if path == "/items"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_check_allowed_status() {
        let ok = check(response(404, ""), "/x", true, &[404]).unwrap();
        assert_eq!(ok.status, 404);

        let err = check(response(404, ""), "/x", true, &[]).unwrap_err();
        assert!(err.is_retryable());

        assert!(check(response(503, ""), "/x", false, &[]).is_ok());
    }
}
