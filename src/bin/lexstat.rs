//! # lexstat
//!
//! Runs one pipeline service, or all four in a single process.
//!
//! ```text
//! lexstat storage
//! lexstat --environment production --config-dir /etc/lexstat all
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

use lexstat::bootstrap::{self, ServiceRole};
use lexstat::config::ConfigManager;
use lexstat::logging;

#[derive(Parser)]
#[command(name = "lexstat")]
#[command(about = "Cache-aside lexical statistics pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration directory (default: config)
    #[arg(short, long, env = "LEXSTAT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load (default: LEXSTAT_ENV, APP_ENV or development)
    #[arg(short, long)]
    environment: Option<String>,

    /// Log the effective configuration before starting
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Serve the corpus (ReadText)
    TextSource,
    /// Compute statistics (AnalyzeText)
    Analyzer,
    /// Cache-aside coordinator (GetData)
    Storage,
    /// RPC endpoint and public results page (GetDisplayData, GET /)
    Presenter,
    /// All four services in this process
    All,
}

impl From<Command> for ServiceRole {
    fn from(command: Command) -> Self {
        match command {
            Command::TextSource => ServiceRole::TextSource,
            Command::Analyzer => ServiceRole::Analyzer,
            Command::Storage => ServiceRole::Storage,
            Command::Presenter => ServiceRole::Presenter,
            Command::All => ServiceRole::All,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_structured_logging();

    let environment = cli.environment.unwrap_or_else(logging::get_environment);
    let manager =
        ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &environment)
            .context("failed to load configuration")?;

    if cli.print_config {
        info!(config = %manager.debug_config(), "Effective configuration");
    }

    let role = ServiceRole::from(cli.command);
    info!(role = ?role, environment = %manager.environment(), "Starting lexstat");

    let handle = bootstrap::start_role(role, &manager)
        .await
        .context("failed to start services")?;

    for service in handle.services() {
        info!(service = service.name(), url = %service.base_url(), "Ready");
    }

    signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    handle.stop_all().await.context("shutdown failed")?;
    info!("All services stopped");

    Ok(())
}
