// Courier Daemon - JSON-RPC facade over the Messenger provider
//
// This daemon provides:
// - A single HTTP endpoint dispatching named RPC methods
// - One process-wide authenticated platform session
// - Session snapshot persistence to disk

use courier_config::CourierConfig;
use courier_daemon::{server, FileSnapshotStore, RpcContext, SessionHolder};
use courier_messenger::MessengerProvider;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit codes for different scenarios
mod exit_codes {
    pub const CONFIG_ERROR: i32 = 1;
    pub const SERVER_ERROR: i32 = 2;
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!(
        "Starting courier daemon v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = match CourierConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let provider =
        match MessengerProvider::new(&config.provider.base_url, &config.provider.user_agent) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                error!("Failed to build platform client: {}", e);
                process::exit(exit_codes::CONFIG_ERROR);
            }
        };

    let snapshots = Arc::new(FileSnapshotStore::new(&config.snapshot.path));
    let sessions = Arc::new(SessionHolder::new(provider, snapshots));
    let ctx = Arc::new(RpcContext::new(sessions));

    if let Err(e) = server::serve(&config, ctx).await {
        error!("Server error: {}", e);
        process::exit(exit_codes::SERVER_ERROR);
    }
}
