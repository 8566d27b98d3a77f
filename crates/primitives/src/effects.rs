use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a response should include, mirrored to wallets and the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
    pub show_effects: bool,
    pub show_object_changes: bool,
    pub show_events: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            show_effects: true,
            show_object_changes: true,
            show_events: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectChangeKind {
    Created,
    Mutated,
    Deleted,
    Transferred,
    Published,
    Wrapped,
    #[serde(other)]
    Unknown,
}

/// One entry of the `objectChanges` list of an execution response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub kind: ObjectChangeKind,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
}

/// Raw response of an executed transaction, as the node or wallet returns it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub effects: Option<Value>,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    #[serde(default)]
    pub events: Vec<Value>,
    #[serde(default)]
    pub balance_changes: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectsStatus {
    Success,
    Failure(String),
    Unknown,
}

impl ExecutionResponse {
    /// `effects.status` of the response, `Unknown` when effects were not requested.
    pub fn status(&self) -> EffectsStatus {
        let Some(status) = self.effects.as_ref().and_then(|e| e.get("status")) else {
            return EffectsStatus::Unknown;
        };
        match status.get("status").and_then(Value::as_str) {
            Some("success") => EffectsStatus::Success,
            Some("failure") => EffectsStatus::Failure(
                status
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("transaction failed on chain")
                    .to_string(),
            ),
            _ => EffectsStatus::Unknown,
        }
    }

    pub fn created_objects(&self) -> impl Iterator<Item = &ObjectChange> {
        self.object_changes
            .iter()
            .filter(|change| change.kind == ObjectChangeKind::Created)
    }
}
