//! Materials consumer entry point
//!
//! Run with:
//! ```bash
//! cargo run -p materials-consumer
//! ```

use materials_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {}", e);
    }

    info!(service = %config.app.name, env = ?config.app.env, "Starting materials consumer");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            return;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = materials_consumer::run(config, shutdown_rx).await {
        error!(error = %e, "Consumer failed");
        std::process::exit(1);
    }
}
