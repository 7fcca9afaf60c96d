//! Outbound provider access for stepwise.
//!
//! The chat-completions provider implements `stepwise_core::Provider`, the
//! token-check client implements `stepwise_core::TokenGateway`, and
//! `catalog` maps the provider's model listing onto known models.

pub mod catalog;
mod http;
pub mod openai_compat;
pub mod router;
pub mod token_budget;

pub use catalog::list_known_models;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderStack, build_from_config};
pub use token_budget::{HttpTokenGateway, TEST_TOKEN_FIT};
