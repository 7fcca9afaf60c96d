//! `stepwise serve`: Start the HTTP API server.

use stepwise_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("stepwise gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.default_model);
    println!(
        "   Sessions:  {}",
        if config.gateway.session_tokens.is_empty() {
            "not enforced".to_string()
        } else {
            format!("{} token(s)", config.gateway.session_tokens.len())
        }
    );

    stepwise_gateway::start(config).await?;

    Ok(())
}
