//! # stepwise core
//!
//! Domain types, traits, and error definitions for the stepwise planning
//! engine. This crate has **no framework dependencies**: it defines the
//! model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! The engine is re-entered once per reasoning step. Nothing here holds task
//! state between calls; a task is reconstructed from what the caller sends
//! back (message, enabled tools, observations, task identity).
//!
//! Every external collaborator is a trait here:
//! - [`Provider`] for the language model
//! - [`TokenGateway`] for context-window accounting
//! - [`Tool`] for the descriptors the model chooses between

pub mod credential;
pub mod error;
pub mod message;
pub mod model;
pub mod planning;
pub mod provider;
pub mod task;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use credential::Credential;
pub use error::{Error, ProviderError, Result};
pub use message::{Message, MessageToolCall, Role};
pub use model::{ModelCatalog, ModelRef, ModelSpec};
pub use planning::{PlanningRequest, PlanningResponse, PlanningResult, StepMetadata};
pub use provider::{Provider, ProviderRequest, ProviderResponse, TokenFit, TokenGateway, ToolDefinition};
pub use task::TaskId;
pub use tool::{Observation, Tool, ToolRegistry};
