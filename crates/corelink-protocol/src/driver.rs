//! Driver resources
//!
//! A driver is user-supplied code tracked by Core from a repository. These are
//! the shapes returned by the `/drivers` family of endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the driver listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverSummary {
    /// Driver name, unique within Core
    pub name: String,

    /// Branch Core currently tracks for this driver
    #[serde(default)]
    pub branch: Option<String>,

    /// Commit currently checked out
    #[serde(default)]
    pub commit: Option<String>,

    /// Whether the driver is loaded into at least one module
    #[serde(default)]
    pub loaded: bool,
}

/// A commit in a driver's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    /// Commit hash
    pub sha: String,

    /// Commit author
    #[serde(default)]
    pub author: Option<String>,

    /// First line of the commit message
    #[serde(default)]
    pub message: String,

    /// Commit time
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A branch of a driver's repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: String,

    /// Commit at the head of the branch
    pub head: String,
}

/// Runtime status of a driver.
///
/// `Default` is the "nothing known" status: not compiled, not loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverStatus {
    /// Whether the current commit compiled successfully
    #[serde(default)]
    pub compiled: bool,

    /// Whether the driver is loaded
    #[serde(default)]
    pub loaded: bool,

    /// Commit the status refers to
    #[serde(default)]
    pub commit: Option<String>,

    /// Errors reported by Core for this driver
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Compilation state of a driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompiledStatus {
    /// Driver name
    pub driver: String,

    /// Whether the last compilation succeeded
    pub compiled: bool,

    /// Commit that was compiled
    #[serde(default)]
    pub commit: Option<String>,

    /// When the last compilation finished
    #[serde(default)]
    pub compiled_at: Option<DateTime<Utc>>,

    /// Compiler diagnostics
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Acknowledgement returned by operations that only trigger work on Core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationAck {
    /// Whether Core accepted the request
    pub accepted: bool,

    /// Optional human-readable detail
    #[serde(default)]
    pub message: Option<String>,
}
