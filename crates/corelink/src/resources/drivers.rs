//! Driver endpoints

use super::segment;
use crate::{client::Client, error::Result, request::EndpointRequest};
use corelink_protocol::{Branch, Commit, CompiledStatus, DriverStatus, DriverSummary, OperationAck};

/// Driver endpoints.
///
/// Drivers are user code Core tracks from a repository; these calls inspect
/// them and ask Core to rebuild or reload them.
#[derive(Debug, Clone, Copy)]
pub struct Drivers<'a> {
    client: &'a Client,
}

impl<'a> Drivers<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List every driver Core knows.
    pub async fn list(&self) -> Result<Vec<DriverSummary>> {
        self.client.request_json(EndpointRequest::get("/drivers")).await
    }

    /// Commit history of `driver`, newest first.
    ///
    /// `limit` caps the number of commits returned.
    pub async fn commits(&self, driver: &str, limit: Option<u32>) -> Result<Vec<Commit>> {
        let mut request = EndpointRequest::get(format!("/drivers/{}/commits", segment(driver)));
        if let Some(limit) = limit {
            request = request.query("limit", limit);
        }
        self.client.request_json(request).await
    }

    /// Look up `branch` of `driver`; `None` when Core answers 404.
    pub async fn branch(&self, driver: &str, branch: &str) -> Result<Option<Branch>> {
        self.client
            .request_optional(EndpointRequest::get(format!(
                "/drivers/{}/branches/{}",
                segment(driver),
                segment(branch)
            )))
            .await
    }

    /// Runtime status of `driver`.
    ///
    /// A 404 means Core has no status yet and yields [`DriverStatus::default`].
    /// Every other failure propagates.
    pub async fn status(&self, driver: &str) -> Result<DriverStatus> {
        let status = self
            .client
            .request_optional(EndpointRequest::get(format!(
                "/drivers/{}/status",
                segment(driver)
            )))
            .await?;
        Ok(status.unwrap_or_default())
    }

    /// Compilation state of `driver`.
    pub async fn compiled(&self, driver: &str) -> Result<CompiledStatus> {
        self.client
            .request_json(EndpointRequest::get(format!(
                "/drivers/{}/compiled",
                segment(driver)
            )))
            .await
    }

    /// Ask Core to recompile `driver`.
    pub async fn recompile(&self, driver: &str) -> Result<OperationAck> {
        self.client
            .request_json(EndpointRequest::post(format!(
                "/drivers/{}/recompile",
                segment(driver)
            )))
            .await
    }

    /// Ask Core to reload `driver` into every module running it.
    pub async fn reload(&self, driver: &str) -> Result<OperationAck> {
        self.client
            .request_json(EndpointRequest::post(format!(
                "/drivers/{}/reload",
                segment(driver)
            )))
            .await
    }
}
