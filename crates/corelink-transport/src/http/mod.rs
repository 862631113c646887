//! HTTP transport implementation
//!
//! Provides a reqwest-backed client that implements the [`Transport`](crate::Transport) trait.
//! Retries are deliberately absent here; they wrap the guarded call one layer up.

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
