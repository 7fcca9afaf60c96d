//! The planning entry point a transport calls into.
//!
//! Resolves what a raw [`PlanningRequest`] leaves implicit (task identity,
//! model, credential), builds the per-call [`AgentContext`], runs one step,
//! and shapes the response. The context, and with it the token encoder, is
//! dropped on every exit path.

use std::sync::Arc;

use stepwise_config::AppConfig;
use stepwise_core::credential::Credential;
use stepwise_core::error::Error;
use stepwise_core::model::{ModelCatalog, ModelSpec};
use stepwise_core::planning::{PlanningRequest, PlanningResponse};
use stepwise_core::provider::{Provider, TokenGateway};
use stepwise_core::task::TaskId;
use tracing::{info, warn};

use crate::context::{AgentContext, RequestScope};
use crate::encoder::{HeuristicEncoderFactory, SharedEncoderFactory};
use crate::planner::{PlanningOrchestrator, StepInput};

pub struct PlanningService {
    orchestrator: PlanningOrchestrator,
    catalog: ModelCatalog,
    encoders: SharedEncoderFactory,
    default_model: String,
    fallback_key: Option<Credential>,
    verbose: bool,
}

impl PlanningService {
    pub fn new(orchestrator: PlanningOrchestrator, catalog: ModelCatalog) -> Self {
        Self {
            orchestrator,
            catalog,
            encoders: Arc::new(HeuristicEncoderFactory),
            default_model: stepwise_core::model::FALLBACK_MODEL_ID.to_string(),
            fallback_key: None,
            verbose: false,
        }
    }

    /// Wire a service from loaded configuration. The verbosity flag is read
    /// here, once, and shared by every call.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        token_gateway: Arc<dyn TokenGateway>,
    ) -> Self {
        let tools = Arc::new(stepwise_tools::registry_with(config.tool_definitions()));
        let orchestrator = PlanningOrchestrator::from_config(config, provider, token_gateway, tools);

        let mut service = Self::new(orchestrator, config.model_catalog())
            .with_default_model(&config.default_model)
            .with_verbose(config.debug_llm_logging);
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            service = service.with_fallback_key(Credential::new(key));
        }
        service
    }

    pub fn with_encoders(mut self, encoders: SharedEncoderFactory) -> Self {
        self.encoders = encoders;
        self
    }

    pub fn with_default_model(mut self, id: &str) -> Self {
        self.default_model = id.to_string();
        self
    }

    /// Credential used when a request carries none.
    pub fn with_fallback_key(mut self, key: Credential) -> Self {
        self.fallback_key = Some(key);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Run one planning step for `request`.
    pub async fn plan(
        &self,
        scope: RequestScope,
        request: PlanningRequest,
    ) -> Result<PlanningResponse, Error> {
        let task_id = TaskId::resolve(request.task_id.as_deref());
        let model = self.resolve_model(&request)?;
        let credential = self.resolve_credential(&request)?;
        let question = request
            .last_message()
            .map(|m| m.content.as_str())
            .ok_or_else(|| Error::InvalidRequest("no messages".into()))?;

        let request_id = scope.request_id.clone();
        let ctx = AgentContext::create(scope, self.encoders.as_ref(), model, credential, self.verbose)?;

        let outcome = self
            .orchestrator
            .step(
                &ctx,
                StepInput {
                    question,
                    enabled_tools: &request.enabled_tool_names,
                    observations: &request.observations,
                },
            )
            .await;
        drop(ctx);

        match outcome {
            Ok(report) => {
                info!(
                    request_id = %request_id,
                    task_id = %task_id,
                    model = %report.metadata.model,
                    state = ?report.state,
                    token_count = report.metadata.token_count,
                    "Planning step complete"
                );
                Ok(PlanningResponse {
                    result: report.result,
                    task_id,
                    metadata: Some(report.metadata),
                })
            }
            Err(e) => {
                warn!(request_id = %request_id, task_id = %task_id, code = e.code(), "Planning step failed: {e}");
                Err(e)
            }
        }
    }

    fn resolve_model(&self, request: &PlanningRequest) -> Result<ModelSpec, Error> {
        let id = request
            .model
            .as_ref()
            .map(|m| m.id.as_str())
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(self.default_model.as_str());
        self.catalog
            .get(id)
            .cloned()
            .ok_or_else(|| Error::InvalidRequest(format!("unknown model '{id}'")))
    }

    fn resolve_credential(&self, request: &PlanningRequest) -> Result<Credential, Error> {
        request
            .key
            .as_ref()
            .filter(|k| !k.is_empty())
            .or(self.fallback_key.as_ref())
            .cloned()
            .ok_or(Error::Unauthorized)
    }
}
