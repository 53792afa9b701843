use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use parley_config::{expand_tilde, ConfigManager};
use parley_observability::{LogConfig, LogManager};
use parley_server::{run_server, AppState};

#[derive(Parser, Debug)]
#[command(name = "parley-server", version, about = "Parley conversational backend")]
struct Cli {
    /// Config file
    #[arg(short, long, env = "PARLEY_CONFIG", default_value = "~/.parley/config.json")]
    config: String,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Active LLM provider (gemini, claude, groq, cohere)
    #[arg(long)]
    provider: Option<String>,

    #[arg(long)]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    debug: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = expand_tilde(&cli.config).unwrap_or_else(|| PathBuf::from(&cli.config));
    let mut config = ConfigManager::load(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {:?}", config_path))?
        .into_config();

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(provider) = cli.provider {
        config.llm.provider = provider.trim().to_lowercase();
    }
    ConfigManager::validate(&config).context("Invalid configuration")?;

    let mut log_config = LogConfig::from(&config.logging);
    if cli.debug {
        log_config = log_config.with_log_level("debug");
    } else if let Some(level) = cli.log_level {
        log_config = log_config.with_log_level(level);
    }
    let _log_manager = LogManager::new(log_config)?;

    info!("Parley v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(&config, |key| std::env::var(key).ok())
        .await
        .context("Failed to initialise the LLM provider")?;

    run_server(state, &config.server.host, config.server.port).await?;

    Ok(())
}
