//! Controller entry point
//!
//! Run with:
//! ```bash
//! cargo run -p warden-controller
//! ```
//!
//! Configuration is loaded from environment variables; every controller is
//! bound to one game server via `CONTROLLER_SERVER_NUMBER`.

use tracing::{error, info};
use warden_common::{try_init_tracing, AppConfig, TracingConfig};

mod app;

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing(&TracingConfig::default()) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Controller failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting warden controller...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        server_number = config.controller.server_number,
        "Configuration loaded"
    );

    app::run(config).await
}
