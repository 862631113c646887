//! Wire types for talking to Core
//!
//! This crate provides the JSON shapes exchanged with Core's REST surface and
//! the names of the headers the client and server agree on. Everything here is
//! plain data: no I/O, no retries, no status handling.
//!
//! # Type Organization
//!
//! - **Drivers**: [`driver`] - listings, commits, branches, status, compile state
//! - **Modules**: [`module`] - load requests, handles and status
//! - **Nodes**: [`node`] - per-node load/health and cluster aggregates
//! - **Chaos**: [`chaos`] - fault injection requests and experiments
//! - **Execute channel**: [`exec`] - the `__exec__` envelope and remote exception payload
//! - **Headers**: [`headers`] - correlation and secondary-status header names

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chaos;
pub mod driver;
pub mod error;
pub mod exec;
pub mod headers;
pub mod module;
pub mod node;

// Re-export commonly used types at crate level
pub use chaos::{ChaosExperiment, ChaosFault, ChaosRequest};
pub use driver::{
    Branch, Commit, CompiledStatus, DriverStatus, DriverSummary, OperationAck,
};
pub use error::{ProtocolError, Result};
pub use exec::{ExecEnvelope, RemoteException};
pub use module::{LoadModuleRequest, ModuleHandle, ModuleState, ModuleStatus};
pub use node::{ClusterHealth, ClusterStatus, NodeError, NodeHealth, NodeLoad, NodeStatus};
