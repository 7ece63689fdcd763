//! Requests to route the host application elsewhere.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Destination for the instance setup form.
pub const DESTINATION_CREATE_INSTANCE: &str = "create-instance";
/// Destination for the full issue report form.
pub const DESTINATION_REPORT_ISSUE: &str = "report-issue";
/// Destination for an instance's home page.
pub const DESTINATION_INSTANCE: &str = "instance";

/// A page change asked of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub destination_id: String,
    /// Whether the chat widget should close after navigating.
    pub should_close: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl NavigationRequest {
    pub fn new(destination_id: impl Into<String>) -> Self {
        Self {
            destination_id: destination_id.into(),
            should_close: false,
            params: BTreeMap::new(),
        }
    }

    /// Same request, closing the widget on arrival.
    pub fn closing(mut self) -> Self {
        self.should_close = true;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
