//! Error types for the corelink SDK
//!
//! Remote failures are described by [`ClientError`], which always carries the
//! request path, the transport status and the service-declared response code.
//! Its [`ClientErrorKind`] tells where the failure came from:
//!
//! - [`Protocol`](ClientErrorKind::Protocol): base classification of a failed response
//! - [`ApiResponse`](ClientErrorKind::ApiResponse): a non-2xx answer to a strictly checked request
//! - [`DriverRaised`](ClientErrorKind::DriverRaised): the module's driver code raised
//! - [`UnexpectedFailure`](ClientErrorKind::UnexpectedFailure): the execute channel got a status it does not know
//!
//! Everything that happens locally (decoding, configuration, the debug socket)
//! has its own variant on [`Error`].

use corelink_core::retry::Retryable;
use corelink_protocol::headers::RESPONSE_CODE;
use corelink_protocol::{ProtocolError, RemoteException};
use corelink_transport::{HttpResponse, TransportError};
use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SDK.
#[derive(Debug, Error)]
pub enum Error {
    /// Core answered, and the answer is a failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A successful response carried a payload of the wrong shape.
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        /// Request path
        path: String,
        /// Underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// A 203 answer did not carry a readable exception payload.
    #[error("Malformed remote exception (response code {response_code}): {source}")]
    MalformedException {
        /// Service-declared response code of the 203 answer
        response_code: u16,
        /// Underlying parse failure
        #[source]
        source: ProtocolError,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Debug stream misuse or failure outside the socket itself.
    #[error("Debug stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Check if this error is retryable.
    ///
    /// Transport failures and strict-check API failures are transient; every
    /// other kind is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Client(err) => err.is_retryable(),
            Error::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// The remote failure, if this error is one.
    pub fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Client(err) => Some(err),
            _ => None,
        }
    }

    /// Transport status of the failed response, if Core answered at all.
    pub fn status_code(&self) -> Option<u16> {
        self.as_client_error().map(|e| e.status_code)
    }

    /// Whether Core answered with 404.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl Retryable for Error {
    fn is_retryable(&self) -> bool {
        Error::is_retryable(self)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::InvalidRequest(err.to_string())
    }
}

/// Where a [`ClientError`] originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    /// Base classification of a failed response
    Protocol,
    /// Non-2xx answer to a strictly checked request
    ApiResponse,
    /// The module's driver code raised an exception
    DriverRaised,
    /// Status the execute channel does not recognize
    UnexpectedFailure,
}

/// A failure reported by Core.
///
/// # Examples
///
/// ```
/// use corelink::ClientError;
/// use corelink_transport::HttpResponse;
///
/// let mut headers = http::HeaderMap::new();
/// headers.insert("Response-Code", "208".parse().unwrap());
/// let response = HttpResponse::new(200, headers, "some data");
///
/// let err = ClientError::from_response(&response, "/testing");
/// assert_eq!(err.message, "request to /testing failed with some data");
/// assert_eq!(err.status_code, 200);
/// assert_eq!(err.response_code, 208);
/// assert!(err.remote_backtrace.is_none());
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (status {status_code}, response code {response_code})")]
pub struct ClientError {
    /// Where the failure originated
    pub kind: ClientErrorKind,
    /// Human readable description
    pub message: String,
    /// Request path
    pub path: String,
    /// Transport status
    pub status_code: u16,
    /// Service-declared secondary status
    pub response_code: u16,
    /// Remote stack trace, only for driver exceptions
    pub remote_backtrace: Option<Vec<String>>,
}

impl ClientError {
    /// Classify a response as a [`Protocol`](ClientErrorKind::Protocol) failure.
    pub fn from_response(response: &HttpResponse, path: &str) -> Self {
        let body = response.text();
        Self {
            kind: ClientErrorKind::Protocol,
            message: failure_message(path, &body),
            path: path.to_string(),
            status_code: response.status,
            response_code: response_code(response),
            remote_backtrace: None,
        }
    }

    /// A non-2xx answer to a strictly checked request.
    pub fn api_response(response: &HttpResponse, path: &str) -> Self {
        Self {
            kind: ClientErrorKind::ApiResponse,
            ..Self::from_response(response, path)
        }
    }

    /// A status the execute channel does not recognize.
    pub fn unexpected_failure(response: &HttpResponse, path: &str) -> Self {
        Self {
            kind: ClientErrorKind::UnexpectedFailure,
            ..Self::from_response(response, path)
        }
    }

    /// The driver raised `exception`; `response_code` is the declared code (500 when absent).
    pub fn driver_raised(
        path: &str,
        status_code: u16,
        response_code: u16,
        exception: RemoteException,
    ) -> Self {
        Self {
            kind: ClientErrorKind::DriverRaised,
            message: exception.error,
            path: path.to_string(),
            status_code,
            response_code,
            remote_backtrace: exception.backtrace,
        }
    }

    /// Only strict-check failures are transient; driver exceptions and
    /// unknown statuses are final.
    pub fn is_retryable(&self) -> bool {
        self.kind == ClientErrorKind::ApiResponse
    }
}

/// Service-declared response code of `response`.
///
/// The `Response-Code` header wins when present and numeric. Otherwise any
/// 2xx maps to 200 and everything else to the transport status.
pub fn response_code(response: &HttpResponse) -> u16 {
    declared_response_code(response).unwrap_or(if response.is_success() {
        200
    } else {
        response.status
    })
}

/// The `Response-Code` header, if present and numeric.
pub fn declared_response_code(response: &HttpResponse) -> Option<u16> {
    response
        .header(RESPONSE_CODE)
        .and_then(|v| v.trim().parse::<u16>().ok())
}

fn failure_message(path: &str, body: &str) -> String {
    if body.is_empty() {
        format!("request to {} failed", path)
    } else {
        format!("request to {} failed with {}", path, body)
    }
}
