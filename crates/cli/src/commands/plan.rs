//! `stepwise plan`: run one planning step and print the response.
//!
//! The caller plays the tool executor: run the proposed action yourself, then
//! call again with `--task-id` and an `--observation` for its result.

use serde_json::Value;
use stepwise_agent::{PlanningService, RequestScope};
use stepwise_config::AppConfig;
use stepwise_core::credential::Credential;
use stepwise_core::message::Message;
use stepwise_core::model::ModelRef;
use stepwise_core::planning::PlanningRequest;
use stepwise_core::tool::Observation;
use tokio_util::sync::CancellationToken;

pub struct PlanArgs {
    pub message: String,
    pub tools: Vec<String>,
    pub observations: Vec<Observation>,
    pub task_id: Option<String>,
    pub model: Option<String>,
    pub key: Option<String>,
}

impl PlanArgs {
    fn into_request(self) -> PlanningRequest {
        PlanningRequest {
            model: self.model.map(ModelRef::id),
            key: self.key.map(Credential::new),
            messages: vec![Message::user(self.message)],
            enabled_tool_names: self.tools,
            observations: self.observations,
            task_id: self.task_id,
        }
    }
}

pub async fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if args.key.is_none() && !config.has_api_key() {
        return Err("No API key found. Set STEPWISE_API_KEY or OPENAI_API_KEY, or pass --key.".into());
    }

    let stack = stepwise_providers::build_from_config(&config);
    let service = PlanningService::from_config(&config, stack.provider, stack.token_gateway);

    // Ctrl-C cancels the in-flight step.
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let result = service
        .plan(RequestScope::with_cancel(cancel), args.into_request())
        .await;
    watcher.abort();

    let response = result?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Parse `<tool>=<result>` or `<tool>:<json-args>=<result>`.
pub fn parse_observation(raw: &str) -> Result<Observation, String> {
    let split = raw
        .find(['=', ':'])
        .ok_or_else(|| format!("expected <tool>=<result>, got '{raw}'"))?;
    let tool = raw[..split].trim();
    if tool.is_empty() {
        return Err(format!("missing tool name in '{raw}'"));
    }

    let rest = &raw[split..];
    let (arguments, result) = match rest.strip_prefix(':') {
        Some(rest) => {
            let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
            let arguments = values
                .next()
                .ok_or_else(|| format!("missing arguments for {tool}"))?
                .map_err(|e| format!("invalid arguments for {tool}: {e}"))?;
            let after = rest[values.byte_offset()..].trim_start();
            let result = after
                .strip_prefix('=')
                .ok_or_else(|| format!("expected '=' after the arguments for {tool}"))?;
            (arguments, result)
        }
        None => (Value::Object(serde_json::Map::new()), &rest[1..]),
    };

    Ok(Observation::new(tool, arguments, result.to_string()))
}
