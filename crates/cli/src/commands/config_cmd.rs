//! `stepwise config`: Configuration management commands.

use stepwise_config::AppConfig;

const REDACTED: &str = "[REDACTED]";

pub fn print_default() {
    println!("{}", AppConfig::default_toml());
}

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   Config parsed and validated");

            if !config.has_api_key() {
                println!("   warning: no API key set (STEPWISE_API_KEY or OPENAI_API_KEY); callers must send their own");
            }
            if config.gateway.session_tokens.is_empty() {
                println!("   warning: no session tokens; /v1 routes accept any caller");
            }

            println!();
            println!("   Host:     {}", config.api_host);
            println!("   Model:    {}", config.default_model);
            println!("   Models:   {}", config.model_catalog().len());
            println!("   Tools:    {} configured", config.tools.len());
            println!("   Gateway:  {}:{}", config.gateway.host, config.gateway.port);
            println!("   Repeats:  {:?}", config.agent.on_repeated_action);
        }
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&redacted(config))?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
}

fn redacted(mut config: AppConfig) -> AppConfig {
    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.into());
    }
    for token in &mut config.gateway.session_tokens {
        *token = REDACTED.into();
    }
    config
}
