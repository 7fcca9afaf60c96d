//! Configuration loading, validation, and management for stepwise.
//!
//! Loads configuration from `~/.stepwise/config.toml` with environment
//! variable overrides applied once, at process start. Validates all settings
//! before anything is served.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stepwise_core::model::{FALLBACK_MODEL_ID, ModelCatalog, ModelSpec};
use stepwise_core::provider::ToolDefinition;

/// The root configuration structure.
///
/// Maps directly to `~/.stepwise/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service-wide fallback credential, used when a caller sends none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the model provider (no trailing `/v1`)
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Reserved credential that makes the token gateway answer offline
    #[serde(default = "default_test_api_key")]
    pub test_api_key: String,

    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature for planning calls
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens the model may generate per step
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Timeout for every outbound HTTP call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log assembled prompts and raw model output
    #[serde(default)]
    pub debug_llm_logging: bool,

    /// Planning behaviour
    #[serde(default)]
    pub agent: AgentSettings,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Extra or overriding model catalog entries
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    /// Extra tool descriptors
    #[serde(default)]
    pub tools: Vec<ToolEntry>,
}

fn default_api_host() -> String {
    "https://api.openai.com".into()
}
fn default_test_api_key() -> String {
    "test-api-key".into()
}
fn default_model() -> String {
    FALLBACK_MODEL_ID.into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    512
}
fn default_request_timeout_secs() -> u64 {
    60
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_host", &self.api_host)
            .field("test_api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("debug_llm_logging", &self.debug_llm_logging)
            .field("agent", &self.agent)
            .field("gateway", &self.gateway)
            .field("models", &self.models)
            .field("tools", &self.tools)
            .finish()
    }
}

/// What to do when the model proposes an action it has already observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatedActionPolicy {
    /// Finish the task with the latest matching observation
    #[default]
    Answer,
    /// Fail the step
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// How many identical prior observations make a proposal a repeat
    #[serde(default = "default_max_identical_actions")]
    pub max_identical_actions: usize,

    #[serde(default)]
    pub on_repeated_action: RepeatedActionPolicy,
}

fn default_max_identical_actions() -> usize {
    1
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_identical_actions: default_max_identical_actions(),
            on_repeated_action: RepeatedActionPolicy::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Accepted session tokens. Empty disables session enforcement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_tokens: Vec<String>,
}

fn default_port() -> u16 {
    42618
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            session_tokens: Vec::new(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("session_tokens", &self.session_tokens.len())
            .finish()
    }
}

/// A model catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub max_length: u32,
    pub token_limit: u32,
}

impl From<&ModelEntry> for ModelSpec {
    fn from(entry: &ModelEntry) -> Self {
        ModelSpec {
            id: entry.id.clone(),
            name: entry.name.clone().unwrap_or_else(|| entry.id.clone()),
            max_length: entry.max_length,
            token_limit: entry.token_limit,
        }
    }
}

/// A tool descriptor declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    #[serde(default = "default_tool_parameters")]
    pub parameters: serde_json::Value,
}

fn default_tool_parameters() -> serde_json::Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl AppConfig {
    /// Load configuration from the default path (~/.stepwise/config.toml),
    /// then apply environment overrides.
    ///
    /// - `STEPWISE_API_KEY`, then `OPENAI_API_KEY`
    /// - `OPENAI_API_HOST`
    /// - `STEPWISE_MODEL`
    /// - `DEBUG_AGENT_LLM_LOGGING` (`true` enables prompt logging)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("STEPWISE_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(host) = lookup("OPENAI_API_HOST") {
            self.api_host = host;
        }
        if let Some(model) = lookup("STEPWISE_MODEL") {
            self.default_model = model;
        }
        if let Some(flag) = lookup("DEBUG_AGENT_LLM_LOGGING") {
            self.debug_llm_logging = flag == "true";
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".stepwise")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_identical_actions == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_identical_actions must be at least 1".into(),
            ));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.port must be non-zero".into(),
            ));
        }

        if let Some(model) = self.models.iter().find(|m| m.token_limit == 0) {
            return Err(ConfigError::ValidationError(format!(
                "model '{}' has a zero token_limit",
                model.id
            )));
        }

        if !self.model_catalog().contains(&self.default_model) {
            return Err(ConfigError::ValidationError(format!(
                "default_model '{}' is not in the model catalog",
                self.default_model
            )));
        }

        Ok(())
    }

    /// Built-in models with configured entries layered on top.
    pub fn model_catalog(&self) -> ModelCatalog {
        let mut catalog = ModelCatalog::builtin();
        for entry in &self.models {
            catalog.insert(ModelSpec::from(entry));
        }
        catalog
    }

    /// Tool descriptors declared in configuration.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect()
    }

    /// Check if a fallback API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: default_api_host(),
            test_api_key: default_test_api_key(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            debug_llm_logging: false,
            agent: AgentSettings::default(),
            gateway: GatewayConfig::default(),
            models: vec![],
            tools: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.agent.max_identical_actions, 1);
        assert_eq!(config.agent.on_repeated_action, RepeatedActionPolicy::Answer);
        assert!(!config.debug_llm_logging);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_repetition_threshold_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_identical_actions = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn unknown_default_model_rejected() {
        let config = AppConfig {
            default_model: "no-such-model".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api_host, "https://api.openai.com");
    }

    #[test]
    fn loads_models_and_tools_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "tiny"
debug_llm_logging = true

[agent]
max_identical_actions = 2
on_repeated_action = "fail"

[[models]]
id = "tiny"
max_length = 4000
token_limit = 1024

[[tools]]
name = "stock_quote"
description = "Latest price for a ticker"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.debug_llm_logging);
        assert_eq!(config.agent.on_repeated_action, RepeatedActionPolicy::Fail);
        assert_eq!(config.model_catalog().get("tiny").unwrap().token_limit, 1024);
        assert_eq!(config.model_catalog().get("tiny").unwrap().name, "tiny");
        let tools = config.tool_definitions();
        assert_eq!(tools[0].name, "stock_quote");
        assert_eq!(tools[0].parameters["type"], "object");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_API_HOST", "http://localhost:9999"),
            ("DEBUG_AGENT_LLM_LOGGING", "true"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.api_host, "http://localhost:9999");
        assert!(config.debug_llm_logging);
    }

    #[test]
    fn configured_key_beats_env() {
        let mut config = AppConfig {
            api_key: Some("sk-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|k| (k == "STEPWISE_API_KEY").then(|| "sk-env".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let out = format!("{config:?}");
        assert!(!out.contains("sk-secret"));
        assert!(!out.contains("test-api-key"));
    }
}
