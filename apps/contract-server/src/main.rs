mod config;
mod logging;
mod signals;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use contract::ContractModule;
use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, CliOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// TKS contract service
#[derive(Parser)]
#[command(name = "contract-server")]
#[command(about = "TKS contract service - CSP identity provisioning and contract records")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address override for the gRPC server (overrides config)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        listen: cli.listen,
        verbose: cli.verbose,
    });

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_pretty_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    config.contract.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    logging::init(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "contract server starting");

    let module = ContractModule::init(&config.contract).await?;

    let cancel = CancellationToken::new();
    tokio::spawn(signals::cancel_on_signal(cancel.clone()));

    contract::server::serve_tcp(config.server.listen_addr, &module, cancel).await?;

    tracing::info!("contract server stopped");
    Ok(())
}
