//! `stepwise models`: List known models available to a key.

use stepwise_config::AppConfig;
use stepwise_core::credential::Credential;

pub async fn run(key: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let credential = key
        .or_else(|| config.api_key.clone())
        .filter(|k| !k.is_empty())
        .map(Credential::new)
        .ok_or("No API key found. Set STEPWISE_API_KEY or OPENAI_API_KEY, or pass --key.")?;

    let stack = stepwise_providers::build_from_config(&config);
    let models = stepwise_providers::list_known_models(
        stack.provider.as_ref(),
        &config.model_catalog(),
        &credential,
    )
    .await?;

    if models.is_empty() {
        println!("No known models are available to this key.");
        return Ok(());
    }

    println!("{:<22} {:<22} {:>10} {:>12}", "ID", "NAME", "MAX CHARS", "TOKEN LIMIT");
    for model in &models {
        println!(
            "{:<22} {:<22} {:>10} {:>12}",
            model.id, model.name, model.max_length, model.token_limit
        );
    }

    Ok(())
}
