//! Agent Context: the per-call bundle a planning step runs with.
//!
//! Created at the start of a call and dropped at its end. Dropping it
//! releases the token encoder, so every return path, including `?` and
//! cancellation, tears it down.

use stepwise_core::credential::Credential;
use stepwise_core::error::Error;
use stepwise_core::model::ModelSpec;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::encoder::{EncoderFactory, EncoderLease};

/// Identity and cancellation signal of the inbound call.
#[derive(Debug, Clone)]
pub struct RequestScope {
    pub request_id: String,
    pub cancel: CancellationToken,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::with_cancel(CancellationToken::new())
    }

    /// Scope tied to the caller's cancellation token.
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            cancel,
        }
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AgentContext {
    scope: RequestScope,
    model: ModelSpec,
    credential: Credential,
    encoder: EncoderLease,
    verbose: bool,
}

impl AgentContext {
    /// Acquire an encoder for `model` and bundle it with the call's
    /// credential. `verbose` is the process-wide flag, not a per-request one.
    pub fn create(
        scope: RequestScope,
        encoders: &dyn EncoderFactory,
        model: ModelSpec,
        credential: Credential,
        verbose: bool,
    ) -> Result<Self, Error> {
        let encoder = EncoderLease::acquire(encoders, &model)?;
        Ok(Self {
            scope,
            model,
            credential,
            encoder,
            verbose,
        })
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.encoder.count(text)
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("request_id", &self.scope.request_id)
            .field("model", &self.model.id)
            .field("credential", &self.credential)
            .field("verbose", &self.verbose)
            .finish()
    }
}
