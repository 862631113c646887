//! Transport layer for the corelink client
//!
//! Provides the raw request/response plumbing underneath a corelink session.
//! Nothing in this crate interprets status codes; that is the job of the
//! response decoder in `corelink`.
//!
//! # Architecture
//!
//! - **Transport trait**: one request/response cycle, no retries
//! - **HTTP transport**: reqwest-backed implementation with connect/read/write bounds
//! - **Connection guard**: serializes every cycle on a session through one lock
//! - **Line socket**: WebSocket duplex stream used by the debug channel

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```ignore
//! use corelink_transport::{ConnectionGuard, HttpRequest, HttpTransport, Transport};
//! use std::sync::Arc;
//!
//! let guard = ConnectionGuard::new(Arc::new(HttpTransport::new()?));
//! let request = HttpRequest::get("http://localhost:8080/api/core/v1/drivers");
//! let response = guard
//!     .with_connection(|transport| async move { transport.send(&request).await })
//!     .await?;
//! ```

pub mod error;
pub mod guard;
pub mod http;
pub mod traits;
pub mod ws;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use guard::ConnectionGuard;
pub use http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
pub use ws::LineSocket;
