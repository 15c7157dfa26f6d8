//! Coins oracle service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                 COINS ORACLE                  │
//!                     │                                               │
//!   HTTP request      │  ┌────────┐    ┌──────────┐    ┌──────────┐  │
//!   ──────────────────┼─▶│  http  │───▶│ registry │───▶│ adapters │──┼──▶ bitcoind
//!                     │  │ axum   │    │ asset id │    │ per chain│──┼──▶ rippled
//!   JSON response     │  │        │◀───│  lookup  │◀───│          │──┼──▶ EVM node
//!   ◀─────────────────┼──└────────┘    └──────────┘    └──────────┘  │
//!                     │                                               │
//!                     │  config · observability · resilience · life-  │
//!                     │  cycle                                        │
//!                     └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use coins_oracle::config::{load_config, OracleConfig};
use coins_oracle::lifecycle;
use coins_oracle::observability::logging;

#[derive(Parser)]
#[command(name = "coins-oracle")]
#[command(about = "Uniform query surface over heterogeneous blockchain nodes", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => OracleConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        nodes = config.nodes.len(),
        "coins-oracle starting"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
