//! stepwise CLI: the main entry point.
//!
//! Commands:
//! - `serve`  : Start the HTTP gateway
//! - `plan`   : Run one planning step from the terminal
//! - `models` : List known models available to a key
//! - `config` : Print, locate, or validate configuration

use clap::{Parser, Subcommand};
use stepwise_core::tool::Observation;

mod commands;

#[derive(Parser)]
#[command(
    name = "stepwise",
    about = "stepwise: stepped Plan/Act orchestration for LLM agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run exactly one planning step and print the response as JSON
    Plan {
        /// The message to plan on
        #[arg(short, long)]
        message: String,

        /// Enable a tool for this step (repeatable)
        #[arg(short, long = "tool")]
        tools: Vec<String>,

        /// A prior result: `<tool>=<result>` or `<tool>:<json-args>=<result>` (repeatable)
        #[arg(short, long = "observation", value_parser = commands::plan::parse_observation)]
        observations: Vec<Observation>,

        /// Task identity returned by an earlier step
        #[arg(long)]
        task_id: Option<String>,

        /// Model id (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,

        /// API key (defaults to the configured key)
        #[arg(long)]
        key: Option<String>,
    },

    /// List known models available to the key
    Models {
        /// API key (defaults to the configured key)
        #[arg(long)]
        key: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration TOML
    Default,
    /// Print the effective configuration with secrets redacted
    Show,
    /// Print the config file path
    Path,
    /// Load and validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so `plan` output stays clean.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Plan {
            message,
            tools,
            observations,
            task_id,
            model,
            key,
        } => {
            commands::plan::run(commands::plan::PlanArgs {
                message,
                tools,
                observations,
                task_id,
                model,
                key,
            })
            .await?
        }
        Commands::Models { key } => commands::models::run(key).await?,
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Default) {
            ConfigAction::Default => commands::config_cmd::print_default(),
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Path => commands::config_cmd::path(),
            ConfigAction::Validate => commands::config_cmd::validate()?,
        },
    }

    Ok(())
}
