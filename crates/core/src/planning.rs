//! Wire schema of one planning step.
//!
//! JSON field names are camelCase; `pluginResults` is accepted as an alias
//! for `observations` so older clients keep working.

use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::message::Message;
use crate::model::ModelRef;
use crate::task::TaskId;
use crate::tool::Observation;

/// What a caller submits for one step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    /// Model to plan with; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,

    /// Caller credential, forwarded as a bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Credential>,

    /// Conversation so far; only the last message is planned on.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Tools the model may choose from on this step.
    #[serde(default)]
    pub enabled_tool_names: Vec<String>,

    /// Results of the tools requested by earlier steps, oldest first.
    #[serde(default, alias = "pluginResults")]
    pub observations: Vec<Observation>,

    /// Identity from an earlier step of the same task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl PlanningRequest {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// The outcome of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanningResult {
    /// The caller should run `tool` with `arguments` and call back with the
    /// observation.
    Action {
        tool: String,
        arguments: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<String>,
    },
    /// The task is finished.
    Answer { answer: String },
}

impl PlanningResult {
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }
}

/// Diagnostics about how a step was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMetadata {
    pub model: String,
    /// Local encoder estimate of the prompt size.
    pub estimated_tokens: u32,
    /// Prompt size according to the token gateway.
    pub token_count: u32,
    pub context_length: u32,
    pub observations_used: usize,
}

/// What a caller gets back from one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResponse {
    pub result: PlanningResult,
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StepMetadata>,
}
