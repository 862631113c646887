//! Transport error types

use corelink_core::retry::Retryable;
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while moving bytes to and from Core.
///
/// None of these carry HTTP status semantics: a response with any status code
/// is a successful transport cycle.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Connect, read or write phase exceeded its bound
    #[error("Timeout: {0}")]
    Timeout(String),

    /// I/O error on an established connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while sending the request or reading the response body
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request could not be built (bad URL, header, method)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// WebSocket handshake or framing error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The session's connection was closed
    #[error("Connection closed")]
    Closed,
}

impl Retryable for TransportError {
    /// Transient I/O conditions are retryable; malformed requests, protocol
    /// violations and a deliberately closed session are not.
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connection(_) => true,
            TransportError::Timeout(_) => true,
            TransportError::Io(_) => true,
            TransportError::Http(_) => true,
            TransportError::InvalidRequest(_) => false,
            TransportError::WebSocket(_) => false,
            TransportError::Closed => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::Io(io) => Self::Io(io),
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::Closed,
            WsError::Url(e) => Self::InvalidRequest(e.to_string()),
            other => Self::WebSocket(other.to_string()),
        }
    }
}
