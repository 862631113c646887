//! Module endpoints

use super::segment;
use crate::{
    client::Client, error::Result, execute::ExecResult, request::EndpointRequest,
};
use corelink_protocol::{LoadModuleRequest, ModuleHandle, ModuleStatus, OperationAck};

/// Module endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Modules<'a> {
    client: &'a Client,
}

impl<'a> Modules<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Start a module running `request.driver`.
    pub async fn load(&self, request: &LoadModuleRequest) -> Result<ModuleHandle> {
        self.client
            .request_json(EndpointRequest::post("/modules").json(request)?)
            .await
    }

    /// Status of `module_id`; `None` when Core answers 404.
    pub async fn status(&self, module_id: &str) -> Result<Option<ModuleStatus>> {
        self.client
            .request_optional(EndpointRequest::get(format!("/modules/{}", segment(module_id))))
            .await
    }

    /// Stop and remove `module_id`.
    pub async fn unload(&self, module_id: &str) -> Result<OperationAck> {
        self.client
            .request_json(EndpointRequest::delete(format!(
                "/modules/{}",
                segment(module_id)
            )))
            .await
    }

    /// Call `method` on `module_id`. See [`Client::execute`].
    pub async fn execute(
        &self,
        module_id: &str,
        method: &str,
        arguments: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<ExecResult> {
        self.client
            .execute(module_id, method, arguments, user_id)
            .await
    }
}
