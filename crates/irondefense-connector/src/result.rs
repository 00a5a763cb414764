//! Action results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Final status of one action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failed,
}

/// Outcome of one action invocation, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Action identifier, e.g. `irondefense_rate_alert`.
    pub action: String,
    pub status: ActionStatus,
    pub message: String,
    /// Parameter object the action ran with.
    pub parameter: Value,
    /// Response payloads, in the order they were received.
    pub data: Vec<Value>,
    pub summary: Map<String, Value>,
}

impl ActionResult {
    /// A pending result; starts out failed with no message.
    pub fn new(action: impl Into<String>, parameter: Value) -> Self {
        Self {
            action: action.into(),
            status: ActionStatus::Failed,
            message: String::new(),
            parameter,
            data: Vec::new(),
            summary: Map::new(),
        }
    }

    pub fn succeed(mut self, message: impl Into<String>) -> Self {
        self.status = ActionStatus::Success;
        self.message = message.into();
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.status = ActionStatus::Failed;
        self.message = message.into();
        self
    }

    pub fn add_data(&mut self, value: Value) {
        self.data.push(value);
    }

    pub fn update_summary(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.summary.insert(key.into(), value.into());
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}
