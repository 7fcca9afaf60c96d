//! Tool trait and registry: the contract a tool satisfies to take part in
//! the planning loop.
//!
//! Tools are executed *outside* the engine. The registry only answers two
//! questions: is this name known, and how should it be described to the
//! model. What comes back from an execution is an [`Observation`], which is
//! opaque to the registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Error;
use crate::provider::ToolDefinition;

/// A named capability the model may ask the caller to run.
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Tools declared as plain data (e.g. from configuration).
impl Tool for ToolDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.parameters.clone()
    }
}

/// The result of one external tool execution, fed back on a later step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Tool that produced the result.
    pub tool: String,

    /// Arguments the tool was invoked with.
    #[serde(default, alias = "toolInput")]
    pub arguments: serde_json::Value,

    /// Whatever the tool returned.
    pub result: serde_json::Value,
}

impl Observation {
    pub fn new(
        tool: impl Into<String>,
        arguments: serde_json::Value,
        result: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            tool: tool.into(),
            arguments,
            result: result.into(),
        }
    }

    /// The result as prompt text: strings verbatim, anything else as JSON.
    pub fn result_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this observation records exactly `tool(arguments)`.
    pub fn matches(&self, tool: &str, arguments: &serde_json::Value) -> bool {
        self.tool == tool && &self.arguments == arguments
    }
}

/// A registry of known tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Definitions for the enabled tools, in the caller's order with
    /// duplicates removed. Any unknown name rejects the whole set.
    pub fn resolve_enabled(&self, enabled: &[String]) -> Result<Vec<ToolDefinition>, Error> {
        let mut definitions: Vec<ToolDefinition> = Vec::with_capacity(enabled.len());
        for name in enabled {
            let tool = self
                .get(name)
                .ok_or_else(|| Error::InvalidToolName(name.clone()))?;
            if definitions.iter().all(|d| d.name != *name) {
                definitions.push(tool.to_definition());
            }
        }
        Ok(definitions)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
