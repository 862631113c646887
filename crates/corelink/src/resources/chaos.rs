//! Chaos experiment endpoints

use super::segment;
use crate::{client::Client, error::Result, request::EndpointRequest};
use corelink_protocol::{ChaosExperiment, ChaosRequest, OperationAck};

/// Chaos experiment endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Chaos<'a> {
    client: &'a Client,
}

impl<'a> Chaos<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Inject a fault.
    ///
    /// Injection is not idempotent, so a failed answer is never retried.
    pub async fn inject(&self, request: &ChaosRequest) -> Result<ChaosExperiment> {
        let response = self
            .client
            .request(EndpointRequest::post("/chaos").json(request)?.raises(false))
            .await?;
        crate::decode::decode(&response, "/chaos", true)
    }

    /// Experiments currently running.
    pub async fn list(&self) -> Result<Vec<ChaosExperiment>> {
        self.client.request_json(EndpointRequest::get("/chaos")).await
    }

    /// Stop experiment `id`.
    pub async fn clear(&self, id: &str) -> Result<OperationAck> {
        self.client
            .request_json(EndpointRequest::delete(format!("/chaos/{}", segment(id))))
            .await
    }
}
