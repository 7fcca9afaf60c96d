//! Provider traits: the abstraction over the language model and its
//! token-accounting endpoint.
//!
//! A [`Provider`] sends one prompt and returns one reply. A
//! [`TokenGateway`] tells the engine whether a prompt fits a model's context
//! window. Both carry the caller's credential as a bearer token; neither
//! keeps state between calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::ProviderError;
use crate::message::Message;
use crate::model::ModelSpec;

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-4")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the model may choose from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,

    /// Caller credential; overrides the provider's own key for this call.
    #[serde(skip)]
    pub credential: Option<Credential>,
}

fn default_temperature() -> f32 {
    0.0
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// List the raw model ids visible to `credential`.
    async fn list_models(&self, credential: &Credential) -> Result<Vec<String>, ProviderError>;
}

/// Result of a context-window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFit {
    pub fits: bool,
    pub token_count: u32,
    pub context_length: u32,
}

impl TokenFit {
    /// Whether the prompt can be sent. A gateway that says `fits` but reports
    /// a count above the context length is not trusted.
    pub fn within_window(&self) -> bool {
        self.fits && self.token_count <= self.context_length
    }
}

/// Reports whether a prompt fits a model's context window.
#[async_trait]
pub trait TokenGateway: Send + Sync {
    async fn check_fits(
        &self,
        model: &ModelSpec,
        prompt: &str,
        credential: &Credential,
    ) -> Result<TokenFit, ProviderError>;
}
