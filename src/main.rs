//! Records Gateway
//!
//! Authenticating front door for a clinical records API.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │               RECORDS GATEWAY                │
//!                       │                                              │
//!   Client Request      │  ┌──────────┐   ┌────────────┐   ┌─────────┐ │
//!   ────────────────────┼─▶│  http    │──▶│ auth guard │──▶│ handler │ │
//!                       │  │  layers  │   │  (HS256)   │   └────┬────┘ │
//!                       │  └──────────┘   └─────┬──────┘        │      │
//!                       │                       │ 401           ▼      │
//!   Client Response     │                       ▼        ┌────────────┐│      Records
//!   ◀───────────────────┼────────────────────────────────│  patients  │┼────▶ API
//!                       │                                │   client   ││
//!                       │                                │ retry/502  ││
//!                       │                                └────────────┘│
//!                       │  config · observability · lifecycle          │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use records_gateway::config::load_config;
use records_gateway::lifecycle::startup;
use records_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "records-gateway")]
#[command(about = "Bearer-token gate and resilient patients client", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!("records-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
