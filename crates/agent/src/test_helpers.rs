//! Shared test helpers for orchestrator tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use stepwise_core::credential::Credential;
use stepwise_core::error::{Error, ProviderError};
use stepwise_core::message::{Message, MessageToolCall};
use stepwise_core::model::ModelSpec;
use stepwise_core::provider::{
    Provider, ProviderRequest, ProviderResponse, TokenFit, TokenGateway, Usage,
};
use stepwise_core::tool::ToolRegistry;

use crate::encoder::{EncoderFactory, HeuristicEncoder, TokenEncoder};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider whose only call fails.
    pub fn failing(err: ProviderError) -> Self {
        Self {
            responses: Mutex::new(vec![Err(err)]),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();

        if call >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                call,
                responses.len()
            );
        }

        requests.push(request);
        responses[call].clone()
    }

    async fn list_models(&self, _credential: &Credential) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["gpt-4".into(), "gpt-3.5-turbo".into()])
    }
}

/// Token gateway that answers with a fixed fit and counts calls.
pub struct MockTokenGateway {
    fit: TokenFit,
    calls: AtomicUsize,
}

impl MockTokenGateway {
    pub fn fitting() -> Self {
        Self::with_fit(TokenFit {
            fits: true,
            token_count: 100,
            context_length: 8_192,
        })
    }

    pub fn overflowing(token_count: u32, context_length: u32) -> Self {
        Self::with_fit(TokenFit {
            fits: false,
            token_count,
            context_length,
        })
    }

    pub fn with_fit(fit: TokenFit) -> Self {
        Self {
            fit,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenGateway for MockTokenGateway {
    async fn check_fits(
        &self,
        _model: &ModelSpec,
        _prompt: &str,
        _credential: &Credential,
    ) -> Result<TokenFit, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fit)
    }
}

/// Encoder factory that records every acquire and free.
#[derive(Default)]
pub struct CountingEncoderFactory {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl CountingEncoderFactory {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

struct CountingEncoder {
    released: Arc<AtomicUsize>,
}

impl TokenEncoder for CountingEncoder {
    fn count(&self, text: &str) -> usize {
        HeuristicEncoder.count(text)
    }

    fn free(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl EncoderFactory for CountingEncoderFactory {
    fn acquire(&self, _model: &ModelSpec) -> Result<Box<dyn TokenEncoder>, Error> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingEncoder {
            released: Arc::clone(&self.released),
        }))
    }
}

/// Registry with the built-in descriptors.
pub fn test_registry() -> ToolRegistry {
    stepwise_tools::default_registry()
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut response = make_text_response(thought);
    response.message.tool_calls = tool_calls;
    response
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{}", name),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
