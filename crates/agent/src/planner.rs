//! Planning Orchestrator: one stepped Plan/Act decision per call.
//!
//! Each step:
//!
//! 1. **Validate** the question and the enabled tool names (no outbound call
//!    is made for a malformed request)
//! 2. **Assemble** the prompt from question, tools, and observations
//! 3. **Check fit** with the token gateway; refuse a prompt that overflows
//! 4. **Ask** the provider once
//! 5. **Classify** the reply into an answer or a proposed action
//! 6. **Guard** against re-proposing an already observed action
//!
//! The engine never runs tools. An `Action` result hands control back to the
//! caller, who executes it and calls again with the observation appended.
//! Nothing is retained between steps.

use std::future::Future;
use std::sync::Arc;

use stepwise_config::AppConfig;
use stepwise_core::error::{Error, ProviderError};
use stepwise_core::planning::{PlanningResult, StepMetadata};
use stepwise_core::provider::{Provider, ProviderRequest, TokenGateway};
use stepwise_core::tool::{Observation, ToolRegistry};
use tracing::{debug, info};

use crate::context::{AgentContext, RequestScope};
use crate::decision::{Decision, classify};
use crate::guard::RepetitionGuard;
use crate::prompt::{OBSERVATION_STOP, assemble};

/// Target for the opt-in prompt/response logging.
pub const LLM_LOG_TARGET: &str = "stepwise::llm";

/// Where a task stands after a step, from the engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    Deciding,
    Acting,
    Answering,
    /// An action was handed out; the next step needs its observation.
    AwaitingObservation,
    Done,
}

impl PlanState {
    fn after(result: &PlanningResult) -> Self {
        match result {
            PlanningResult::Action { .. } => PlanState::AwaitingObservation,
            PlanningResult::Answer { .. } => PlanState::Done,
        }
    }
}

/// Inputs of one step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub question: &'a str,
    pub enabled_tools: &'a [String],
    pub observations: &'a [Observation],
}

/// The decision of one step plus how it was reached.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub result: PlanningResult,
    pub state: PlanState,
    pub metadata: StepMetadata,
}

pub struct PlanningOrchestrator {
    /// LLM provider.
    provider: Arc<dyn Provider>,
    /// Token budget authority.
    token_gateway: Arc<dyn TokenGateway>,
    /// Known tools.
    tools: Arc<ToolRegistry>,
    /// Temperature.
    temperature: f32,
    /// Max tokens per response.
    max_tokens: Option<u32>,
    guard: RepetitionGuard,
}

impl PlanningOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        token_gateway: Arc<dyn TokenGateway>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            token_gateway,
            tools,
            temperature: 0.0,
            max_tokens: None,
            guard: RepetitionGuard::default(),
        }
    }

    /// Orchestrator with temperature, response size, and guard from config.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        token_gateway: Arc<dyn TokenGateway>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::new(provider, token_gateway, tools)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_repetition_guard(RepetitionGuard::from_settings(&config.agent))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_repetition_guard(mut self, guard: RepetitionGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Run one planning step.
    pub async fn step(&self, ctx: &AgentContext, input: StepInput<'_>) -> Result<StepReport, Error> {
        let model = ctx.model();

        // --- Validate ---
        let question = input.question.trim();
        if question.is_empty() {
            return Err(Error::InvalidRequest("the last message is empty".into()));
        }
        if question.chars().count() > model.max_length as usize {
            return Err(Error::InvalidRequest(format!(
                "message exceeds {} characters for model {}",
                model.max_length, model.id
            )));
        }
        if let Some(obs) = input.observations.iter().find(|o| o.tool.trim().is_empty()) {
            return Err(Error::InvalidRequest(format!(
                "observation with result {} names no tool",
                obs.result_text()
            )));
        }
        let tools = self.tools.resolve_enabled(input.enabled_tools)?;

        debug!(
            request_id = %ctx.scope().request_id,
            model = %model.id,
            tools = tools.len(),
            observations = input.observations.len(),
            state = ?PlanState::Deciding,
            "Planning step"
        );

        // --- Assemble ---
        let prompt = assemble(question, &tools, input.observations);
        let text = prompt.text();
        let estimated_tokens = ctx.count_tokens(&text);
        if ctx.verbose() {
            info!(target: LLM_LOG_TARGET, model = %model.id, estimated_tokens, prompt = %text, "LLM prompt");
        }

        // --- Check fit ---
        let fit = cancellable(
            ctx.scope(),
            self.token_gateway.check_fits(model, &text, ctx.credential()),
        )
        .await?;
        if !fit.within_window() {
            info!(
                model = %model.id,
                token_count = fit.token_count,
                context_length = fit.context_length,
                "Prompt does not fit the model window"
            );
            return Err(Error::ContextOverflow {
                token_count: fit.token_count,
                context_length: fit.context_length,
            });
        }

        // --- Ask ---
        let request = ProviderRequest {
            model: model.id.clone(),
            messages: prompt.messages(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: prompt.tools.clone(),
            stop: vec![OBSERVATION_STOP.to_string()],
            credential: Some(ctx.credential().clone()),
        };
        let response = cancellable(ctx.scope(), self.provider.complete(request)).await?;
        if ctx.verbose() {
            info!(
                target: LLM_LOG_TARGET,
                model = %response.model,
                content = %response.message.content,
                tool_calls = response.message.tool_calls.len(),
                "LLM response"
            );
        }

        // --- Classify ---
        let decision = classify(&response.message)?;
        if let Decision::Act { tool, .. } = &decision {
            debug!(tool = %tool, state = ?PlanState::Acting, "Model proposed an action");
            if !tools.iter().any(|t| t.name == *tool) {
                return Err(Error::ToolNotEnabled(tool.clone()));
            }
        } else {
            debug!(state = ?PlanState::Answering, "Model answered");
        }

        // --- Guard ---
        let result = self.guard.review(decision, input.observations)?.into_result();
        let state = PlanState::after(&result);

        Ok(StepReport {
            result,
            state,
            metadata: StepMetadata {
                model: model.id.clone(),
                estimated_tokens: u32::try_from(estimated_tokens).unwrap_or(u32::MAX),
                token_count: fit.token_count,
                context_length: fit.context_length,
                observations_used: input.observations.len(),
            },
        })
    }
}

/// Await an outbound call unless the caller goes away first.
async fn cancellable<T, F>(scope: &RequestScope, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        biased;
        _ = scope.cancel.cancelled() => {
            debug!(request_id = %scope.request_id, "Step cancelled by caller");
            Err(Error::Cancelled)
        }
        result = call => result.map_err(Error::from),
    }
}
