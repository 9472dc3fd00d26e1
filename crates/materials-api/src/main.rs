//! Materials API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p materials-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use materials_common::{try_init_tracing_with_config, AppConfig, AppError, TracingConfig};
use tracing::{error, info};

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

    if let Err(e) = run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    info!(
        service = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        "Starting materials API"
    );

    if let Some(logger) = &config.logger {
        info!(host = %logger.host, port = logger.port, "Remote log sink configured");
    }

    materials_api::server::run(config).await
}
