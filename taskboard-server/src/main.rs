//! Taskboard server -- small file-backed task service over HTTP.
//!
//! An axum server exposing CRUD over a collection of task records held in
//! memory and persisted to a single JSON file after every mutation.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:8080, persisting to ./tasks.json
//! cargo run --bin taskboard-server
//!
//! # Run on a custom address with a custom data file
//! cargo run --bin taskboard-server -- --bind 127.0.0.1:3000 --data-file /tmp/tasks.json
//!
//! # Or via environment variables
//! TASKBOARD_ADDR=127.0.0.1:3000 TASKBOARD_DATA=/tmp/tasks.json cargo run --bin taskboard-server
//! ```

use std::sync::Arc;

use clap::Parser;
use taskboard_core::store::TaskStore;
use taskboard_server::api::{self, AppState};
use taskboard_server::config::{ServerCliArgs, ServerConfig};

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

    tracing::info!(
        addr = %config.bind_addr,
        data_file = ?config.data_file,
        "starting taskboard server"
    );

    // Best-effort load: a corrupt or unreadable task file is logged and the
    // server starts empty rather than refusing to come up.
    let store = TaskStore::open(config.data_file.clone());
    let state = Arc::new(AppState::new(store));

    match api::start_server(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "taskboard server listening");
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
