//! # corelink
//!
//! Async Rust client for Core, the orchestration service that runs drivers as
//! modules across a fleet of edge nodes. Supports:
//! - One guarded connection per session, with bounded retries
//! - Typed errors separating transport, protocol and driver failures
//! - The execute channel for calling methods on running modules
//! - The debug channel streaming a module's output line by line
//! - Driver, module, node, cluster and chaos endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use corelink::{Client, ClientConfig};
//! use corelink_protocol::LoadModuleRequest;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("core.internal", 8080))?;
//!
//!     let module = client
//!         .modules()
//!         .load(&LoadModuleRequest::new("lights").branch("main"))
//!         .await?;
//!
//!     let result = client
//!         .execute(&module.module_id, "set_level", json!({"level": 3}), None)
//!         .await?;
//!     println!("{}", result.text());
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, RetrySettings};
pub use debug::{CloseHandle, DebugStream, EndReason, StreamEnd};
pub use error::{ClientError, ClientErrorKind, Error, Result};
pub use execute::{ExecOutcome, ExecResult};
pub use request::EndpointRequest;
pub use resources::{Chaos, Cluster, Drivers, Modules, Nodes};

// Module declarations
pub mod client;
pub mod config;
pub mod debug;
pub mod decode;
pub mod error;
pub mod execute;
pub mod observability;
pub mod request;
pub mod resources;

// Re-export the crates that make up the public surface
pub use corelink_core as core;
pub use corelink_protocol as protocol;
pub use corelink_transport as transport;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use corelink::prelude::*;
/// ```
pub mod prelude {

    pub use crate::{
        Client, ClientConfig, ClientError, ClientErrorKind, EndpointRequest, Error, ExecOutcome,
        ExecResult, Result, RetrySettings,
    };
    pub use corelink_protocol::{
        ChaosFault, ChaosRequest, DriverStatus, LoadModuleRequest, ModuleState,
    };
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
