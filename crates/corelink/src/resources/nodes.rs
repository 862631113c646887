//! Edge node endpoints and cluster aggregates

use super::segment;
use crate::{client::Client, error::Result, request::EndpointRequest};
use chrono::{DateTime, Utc};
use corelink_protocol::{ClusterHealth, ClusterStatus, NodeError, NodeHealth, NodeLoad};

/// Per-node endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Nodes<'a> {
    client: &'a Client,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Resource usage reported by `node_id`.
    pub async fn load(&self, node_id: &str) -> Result<NodeLoad> {
        self.client
            .request_json(EndpointRequest::get(format!("/nodes/{}/load", segment(node_id))))
            .await
    }

    /// Health report of `node_id`.
    pub async fn health(&self, node_id: &str) -> Result<NodeHealth> {
        self.client
            .request_json(EndpointRequest::get(format!(
                "/nodes/{}/health",
                segment(node_id)
            )))
            .await
    }
}

/// Cluster-wide aggregates across every node.
#[derive(Debug, Clone, Copy)]
pub struct Cluster<'a> {
    client: &'a Client,
}

impl<'a> Cluster<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Status of every node.
    pub async fn status(&self) -> Result<ClusterStatus> {
        self.client
            .request_json(EndpointRequest::get("/cluster/status"))
            .await
    }

    /// Errors reported by nodes, optionally only those after `since`.
    pub async fn errors(&self, since: Option<DateTime<Utc>>) -> Result<Vec<NodeError>> {
        let mut request = EndpointRequest::get("/cluster/errors");
        if let Some(since) = since {
            request = request.query("since", since.to_rfc3339());
        }
        self.client.request_json(request).await
    }

    /// Health of every node.
    pub async fn health(&self) -> Result<ClusterHealth> {
        self.client
            .request_json(EndpointRequest::get("/cluster/health"))
            .await
    }
}
