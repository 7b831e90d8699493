//! Tackboard server binary.
//!
//! Serves the HTTP API for boards, lists, tasks, and accounts, and fans
//! out mutation events to WebSocket subscribers per board. All state is
//! in memory.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:5000
//! cargo run --bin tackboard-server
//!
//! # Run on custom address
//! cargo run --bin tackboard-server -- --bind 127.0.0.1:8080
//!
//! # Or via environment variable
//! TACKBOARD_ADDR=127.0.0.1:8080 cargo run --bin tackboard-server
//! ```

use std::sync::Arc;

use clap::Parser;
use tackboard_server::config::{ServerCliArgs, ServerConfig};
use tackboard_server::server::{self, AppState};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting tackboard server");

    let state = Arc::new(AppState::with_bcrypt_cost(config.bcrypt_cost));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
