//! Portfolio analysis agent binary
//!
//! Wires the configured quote source, transport, directory, and metrics
//! into an [`AgentWorker`] and runs its receive loop until the transport
//! closes or the process is interrupted.

use clap::{Parser, Subcommand};
use portfolio_agent::agent::{AgentWorker, AllocationProcessor};
use portfolio_agent::config::AgentConfig;
use portfolio_agent::directory::LoggingDirectory;
use portfolio_agent::error::AgentResult;
use portfolio_agent::observability::{init_default_logging, MetricsCollector};
use portfolio_agent::quotes::AlphaVantageSource;
use portfolio_agent::transport::StdioTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Default config file locations, probed in order
const DEFAULT_CONFIG_PATHS: &[&str] = &["portfolio-agent.toml", "config/portfolio-agent.toml"];

#[derive(Parser)]
#[command(name = "portfolio-agent")]
#[command(about = "Portfolio analysis agent for the finance task exchange")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "PORTFOLIO_AGENT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent receive loop (the default)
    Run,
    /// Validate the configuration and print it
    Config,
}

#[tokio::main]
async fn main() {
    init_default_logging();

    let cli = Cli::parse();

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_agent(config).await,
        Commands::Config => show_config(&config),
    };

    if let Err(e) = result {
        error!(error = %e, "Agent exited with error");
        std::process::exit(1);
    }
}

/// Load configuration from the given path, or probe the default locations.
fn load_configuration(explicit: Option<&Path>) -> AgentResult<AgentConfig> {
    if let Some(path) = explicit {
        return Ok(AgentConfig::load_from_file(path)?);
    }

    for candidate in DEFAULT_CONFIG_PATHS {
        let path = Path::new(candidate);
        if path.exists() {
            info!(path = %path.display(), "Loading configuration");
            return Ok(AgentConfig::load_from_file(path)?);
        }
    }

    Err(portfolio_agent::error::AgentError::internal(format!(
        "no configuration file found; looked for {}",
        DEFAULT_CONFIG_PATHS.join(", ")
    )))
}

fn show_config(config: &AgentConfig) -> AgentResult<()> {
    // The API key itself never appears here, only the env var name
    println!("agent.id = {}", config.agent.id);
    println!("agent.service_type = {}", config.agent.service_type);
    println!(
        "transport.recv_timeout_secs = {}",
        config.transport.recv_timeout_secs
    );
    println!("market_data.base_url = {}", config.market_data.base_url);
    println!("market_data.api_key_env = {}", config.market_data.api_key_env);
    println!(
        "market_data.timeout_secs = {}",
        config.market_data.timeout_secs
    );
    Ok(())
}

async fn run_agent(config: AgentConfig) -> AgentResult<()> {
    let api_key = config.get_api_key()?;

    let quotes = AlphaVantageSource::new(
        config.market_data.base_url.clone(),
        api_key,
        Duration::from_secs(config.market_data.timeout_secs),
    );

    let transport = Arc::new(StdioTransport::new());
    let metrics = Arc::new(MetricsCollector::new());
    let processor = AllocationProcessor::new(Arc::new(quotes));
    let worker = AgentWorker::new(config, transport, processor, Arc::clone(&metrics));

    worker
        .register(&LoggingDirectory)
        .await
        .map_err(portfolio_agent::error::AgentError::transport)?;

    tokio::select! {
        result = worker.run() => result,
        _ = tokio::signal::ctrl_c() => {
            let snapshot = metrics.snapshot();
            info!(
                requests_received = snapshot.requests_received,
                responses_success = snapshot.responses_success,
                responses_failure = snapshot.responses_failure,
                "Interrupted, shutting down"
            );
            Ok(())
        }
    }
}
