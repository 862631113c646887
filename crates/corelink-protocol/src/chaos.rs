//! Chaos experiments
//!
//! Core can inject faults into edge nodes for resilience testing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fault to inject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChaosFault {
    /// Kill a running module
    KillModule {
        /// Module to kill
        module_id: String,
    },
    /// Add latency to every request handled by the node
    Latency {
        /// Added delay in milliseconds
        millis: u64,
    },
    /// Drop a share of the node's requests
    DropRequests {
        /// Share to drop, 0-100
        percent: f64,
    },
    /// Cut the node off from Core
    Partition,
}

/// Body of a fault injection request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChaosRequest {
    /// Target node; Core picks one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// Fault to inject
    pub fault: ChaosFault,

    /// How long the fault lasts; until cleared when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// A running or finished experiment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChaosExperiment {
    /// Experiment identifier
    pub id: String,

    /// Node the fault applies to
    pub node_id: String,

    /// Injected fault
    pub fault: ChaosFault,

    /// Start time
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    /// Scheduled end, if bounded
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
