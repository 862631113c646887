//! Module resources
//!
//! A module is a running instance of a driver, hosted on one node.

use serde::{Deserialize, Serialize};

/// Body of a module load request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadModuleRequest {
    /// Driver to instantiate
    pub driver: String,

    /// Branch to load from; Core's tracked branch when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Node to place the module on; Core decides when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// Driver-specific configuration
    #[serde(default)]
    pub config: serde_json::Value,
}

impl LoadModuleRequest {
    /// Load `driver` with an empty configuration
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            branch: None,
            node_id: None,
            config: serde_json::Value::Object(Default::default()),
        }
    }

    /// Load from a specific branch
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Pin the module to a node
    pub fn node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// Set the driver configuration
    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Handle returned after a successful load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleHandle {
    /// Identifier used by every subsequent module call
    pub module_id: String,

    /// Driver the module runs
    pub driver: String,

    /// Node the module was placed on
    #[serde(default)]
    pub node_id: Option<String>,
}

/// Lifecycle state of a module
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Being compiled or started
    Loading,
    /// Accepting execute calls
    Running,
    /// Stopped on request
    Stopped,
    /// Crashed or failed to start
    Failed,
    /// A state this client version does not know
    #[serde(other)]
    Unknown,
}

/// Status of one module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleStatus {
    /// Module identifier
    pub module_id: String,

    /// Driver the module runs
    pub driver: String,

    /// Lifecycle state
    pub state: ModuleState,

    /// Hosting node
    #[serde(default)]
    pub node_id: Option<String>,

    /// Seconds since the module entered `running`
    #[serde(default)]
    pub uptime_secs: Option<u64>,

    /// Last error the module reported
    #[serde(default)]
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\"loading\"", ModuleState::Loading)]
    #[case("\"running\"", ModuleState::Running)]
    #[case("\"failed\"", ModuleState::Failed)]
    #[case("\"hibernating\"", ModuleState::Unknown)]
    fn test_module_state_parsing(#[case] raw: &str, #[case] expected: ModuleState) {
        let state: ModuleState = serde_json::from_str(raw).unwrap();
        assert_eq!(state, expected);
    }

    #[test]
    fn test_load_request_skips_unset_fields() {
        let request = LoadModuleRequest::new("lights").branch("main");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["driver"], "lights");
        assert_eq!(json["branch"], "main");
        assert!(json.get("node_id").is_none());
        assert_eq!(json["config"], serde_json::json!({}));
    }
}
