//! Node (edge) resources
//!
//! Edge nodes host modules and report load and health back to Core, which
//! aggregates them across the cluster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource usage of one node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeLoad {
    /// Node identifier
    pub node_id: String,

    /// CPU usage, 0-100
    pub cpu_percent: f64,

    /// Memory usage, 0-100
    pub memory_percent: f64,

    /// Number of modules hosted
    #[serde(default)]
    pub modules: u32,
}

/// Health report of one node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeHealth {
    /// Node identifier
    pub node_id: String,

    /// Overall verdict
    pub healthy: bool,

    /// Last time Core heard from the node
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,

    /// Individual check results, keyed by check name
    #[serde(default)]
    pub checks: BTreeMap<String, String>,
}

/// Status of one node inside a cluster aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    /// Node identifier
    pub node_id: String,

    /// Whether the node is reachable
    pub online: bool,

    /// Modules hosted on the node
    #[serde(default)]
    pub modules: Vec<String>,
}

/// Aggregate status across every node
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterStatus {
    /// Per-node status
    #[serde(default)]
    pub nodes: Vec<NodeStatus>,
}

impl ClusterStatus {
    /// Nodes currently online
    pub fn online(&self) -> impl Iterator<Item = &NodeStatus> {
        self.nodes.iter().filter(|n| n.online)
    }
}

/// An error reported by a node or one of its modules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeError {
    /// Reporting node
    pub node_id: String,

    /// Module that raised the error, when attributable
    #[serde(default)]
    pub module_id: Option<String>,

    /// Error text
    pub message: String,

    /// When the error was recorded
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Aggregate health across every node
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterHealth {
    /// Per-node health
    #[serde(default)]
    pub nodes: Vec<NodeHealth>,
}

impl ClusterHealth {
    /// True when every reporting node is healthy
    pub fn all_healthy(&self) -> bool {
        self.nodes.iter().all(|n| n.healthy)
    }

    /// Nodes currently failing their health checks
    pub fn unhealthy(&self) -> impl Iterator<Item = &NodeHealth> {
        self.nodes.iter().filter(|n| !n.healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_health_helpers() {
        let health: ClusterHealth = serde_json::from_str(
            r#"{"nodes":[
                {"node_id":"edge-1","healthy":true},
                {"node_id":"edge-2","healthy":false,"checks":{"disk":"full"}}
            ]}"#,
        )
        .unwrap();

        assert!(!health.all_healthy());
        let unhealthy: Vec<_> = health.unhealthy().map(|n| n.node_id.as_str()).collect();
        assert_eq!(unhealthy, vec!["edge-2"]);
        assert_eq!(health.nodes[1].checks["disk"], "full");
    }

    #[test]
    fn test_empty_cluster_is_healthy() {
        assert!(ClusterHealth::default().all_healthy());
    }

    #[test]
    fn test_cluster_status_online() {
        let status = ClusterStatus {
            nodes: vec![
                NodeStatus {
                    node_id: "a".into(),
                    online: true,
                    modules: vec![],
                },
                NodeStatus {
                    node_id: "b".into(),
                    online: false,
                    modules: vec![],
                },
            ],
        };
        assert_eq!(status.online().count(), 1);
    }
}
