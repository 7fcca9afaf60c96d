//! Stepped Plan/Act orchestration: the heart of stepwise.
//!
//! Each call performs exactly **one** decision:
//!
//! 1. **Receive** the latest message, the enabled tools, and the
//!    observations gathered so far
//! 2. **Check** the assembled prompt against the model's token window
//! 3. **Ask** the provider once
//! 4. **Return** either a final answer or a single proposed action
//!
//! Tool execution happens outside the engine. The caller runs the action
//! and calls again with the observation appended; all task state travels
//! with the request.

pub mod context;
pub mod decision;
pub mod encoder;
pub mod guard;
pub mod planner;
pub mod prompt;
pub mod service;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{AgentContext, RequestScope};
pub use decision::{Decision, classify};
pub use encoder::{
    EncoderFactory, EncoderLease, HeuristicEncoder, HeuristicEncoderFactory, SharedEncoderFactory,
    TokenEncoder, estimate_tokens,
};
pub use guard::RepetitionGuard;
pub use planner::{LLM_LOG_TARGET, PlanState, PlanningOrchestrator, StepInput, StepReport};
pub use prompt::{AssembledPrompt, assemble};
pub use service::PlanningService;
