//! Token Budget Gateway client.
//!
//! Asks the provider's scoring endpoint (`POST {base}/token_check`) whether a
//! prompt fits a model's context window. A reserved test credential short
//! circuits the call with a fixed answer so offline runs are deterministic.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stepwise_core::credential::Credential;
use stepwise_core::error::ProviderError;
use stepwise_core::model::ModelSpec;
use stepwise_core::provider::{TokenFit, TokenGateway};
use tracing::debug;

use crate::http::{client, ensure_success, transport_error};

/// Answer returned for the reserved test credential.
pub const TEST_TOKEN_FIT: TokenFit = TokenFit {
    fits: true,
    token_count: 1066,
    context_length: 2048,
};

/// HTTP implementation of [`TokenGateway`].
pub struct HttpTokenGateway {
    base_url: String,
    test_api_key: Option<Credential>,
    client: reqwest::Client,
}

impl HttpTokenGateway {
    /// `base_url` includes the API version segment, e.g.
    /// `https://api.openai.com/v1`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            test_api_key: None,
            client: client(timeout),
        }
    }

    /// Enable the offline answer for `key`.
    pub fn with_test_api_key(mut self, key: impl Into<String>) -> Self {
        let key = Credential::new(key);
        self.test_api_key = (!key.is_empty()).then_some(key);
        self
    }

    fn is_test_key(&self, credential: &Credential) -> bool {
        self.test_api_key.as_ref() == Some(credential)
    }
}

#[async_trait]
impl TokenGateway for HttpTokenGateway {
    async fn check_fits(
        &self,
        model: &ModelSpec,
        prompt: &str,
        credential: &Credential,
    ) -> Result<TokenFit, ProviderError> {
        if self.is_test_key(credential) {
            debug!(model = %model.id, "Test credential, skipping token check");
            return Ok(TEST_TOKEN_FIT);
        }

        let url = format!("{}/token_check", self.base_url);
        let body = TokenCheckRequest {
            prompts: vec![TokenCheckPrompt {
                model: &model.id,
                prompt,
                max_tokens: model.token_limit,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", credential.bearer())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, "token_check").await?;

        let parsed: TokenCheckResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse token check: {e}")))?;

        let fit = parsed
            .prompts
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("Empty token check response".into()))?;

        debug!(model = %model.id, token_count = fit.token_count, context_length = fit.context_length, fits = fit.fits, "Token check");
        Ok(fit)
    }
}

#[derive(Debug, Serialize)]
struct TokenCheckRequest<'a> {
    prompts: Vec<TokenCheckPrompt<'a>>,
}

#[derive(Debug, Serialize)]
struct TokenCheckPrompt<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct TokenCheckResponse {
    prompts: Vec<TokenFit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn small_model() -> ModelSpec {
        ModelSpec::new("llama-2-7b-chat", "Llama 2 7B Chat", 6_000, 2_048)
    }

    fn gateway_for(server: &MockServer) -> HttpTokenGateway {
        HttpTokenGateway::new(format!("{}/v1", server.uri()), Duration::from_secs(5))
            .with_test_api_key("test-api-key")
    }

    #[tokio::test]
    async fn test_key_is_answered_offline_for_any_prompt() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);
        let key = Credential::new("test-api-key");

        let long = "x".repeat(50_000);
        for prompt in ["", "short", long.as_str()] {
            let fit = gateway.check_fits(&small_model(), prompt, &key).await.unwrap();
            assert_eq!(fit, TEST_TOKEN_FIT);
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sends_model_prompt_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token_check"))
            .and(header("Authorization", "Bearer sk-real"))
            .and(body_json(serde_json::json!({
                "prompts": [{"model": "llama-2-7b-chat", "prompt": "hello", "max_tokens": 2048}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "prompts": [{"fits": true, "tokenCount": 3, "contextLength": 2048}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fit = gateway_for(&server)
            .check_fits(&small_model(), "hello", &Credential::new("sk-real"))
            .await
            .unwrap();
        assert!(fit.fits);
        assert_eq!(fit.token_count, 3);
    }

    #[tokio::test]
    async fn unauthorized_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token_check"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .check_fits(&small_model(), "hello", &Credential::new("sk-bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn other_failures_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token_check"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .check_fits(&small_model(), "hello", &Credential::new("sk"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ApiError { status_code: 400, ref message } if message == "unknown model"
        ));
    }

    #[tokio::test]
    async fn forbidden_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token_check"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota body"))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .check_fits(&small_model(), "hello", &Credential::new("sk"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ApiError { status_code: 403, ref message } if message == "quota body"
        ));
    }

    #[tokio::test]
    async fn empty_prompt_list_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token_check"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"prompts": []})),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .check_fits(&small_model(), "hello", &Credential::new("sk"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
