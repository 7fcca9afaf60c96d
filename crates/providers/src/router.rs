//! Provider wiring: builds the outbound collaborators from config.
//!
//! Everything a planning step talks to over the network hangs off one
//! provider host: chat completions, model listing, and the token check.

use std::sync::Arc;
use std::time::Duration;

use stepwise_core::credential::Credential;
use stepwise_core::provider::{Provider, TokenGateway};

use crate::openai_compat::OpenAiCompatProvider;
use crate::token_budget::HttpTokenGateway;

/// The outbound collaborators shared by every step.
#[derive(Clone)]
pub struct ProviderStack {
    pub provider: Arc<dyn Provider>,
    pub token_gateway: Arc<dyn TokenGateway>,
}

/// Build providers from configuration.
pub fn build_from_config(config: &stepwise_config::AppConfig) -> ProviderStack {
    let base_url = api_base_url(&config.api_host);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let provider = OpenAiCompatProvider::new(
        "openai",
        &base_url,
        config.api_key.as_deref().map(Credential::new),
        timeout,
    );

    let token_gateway =
        HttpTokenGateway::new(&base_url, timeout).with_test_api_key(config.test_api_key.clone());

    ProviderStack {
        provider: Arc::new(provider),
        token_gateway: Arc::new(token_gateway),
    }
}

/// `https://host` → `https://host/v1`; a host already ending in `/v1` is kept.
fn api_base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.ends_with("/v1") {
        host.to_string()
    } else {
        format!("{host}/v1")
    }
}
