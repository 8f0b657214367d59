//! Relay chain (v1)
//!
//! Runs the authentication service, the transform service, the relay and
//! the HTTP front door in one process.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP client
//!       │  POST /  (empty body → "Hello world!")
//!       ▼
//!  ┌──────────┐  mpsc + oneshot  ┌────────┐  [1,2,3,4]         ┌──────────────┐
//!  │  front   │─────────────────▶│ relay  │───────────────────▶│ auth service │──┐
//!  │  door    │◀─────────────────│ worker │◀── [1] + token ────│   :3001      │  │ insert
//!  │  :8080   │  output / status └────────┘                    └──────────────┘  ▼
//!  └──────────┘                     │   token + payload        ┌──────────────┐ ┌───────┐
//!                                   └─────────────────────────▶│  transform   │─│ token │
//!                                     ◀── [1] + PAYLOAD ───────│   :3002      │ │ store │
//!                                                              └──────────────┘ └───────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use relay_chain::config::{load_config, RelayChainConfig};
use relay_chain::lifecycle::{self, signals, Shutdown};
use relay_chain::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "relay-chain")]
#[command(about = "HTTP front door relaying through an auth service and a transform service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayChainConfig::default(),
    };

    logging::init(&config.observability.log_level)?;
    tracing::info!("relay-chain v0.1.0 starting");

    tracing::info!(
        front_door = %config.front_door.bind_address,
        auth_service = %config.auth_service.bind_address,
        transform_service = %config.transform_service.bind_address,
        extended_status = config.protocol.extended_status,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let app = lifecycle::start(&config, &shutdown).await?;

    signals::wait_for_signal().await;
    tracing::info!("Shutting down");
    shutdown.trigger();
    app.wait().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
