//! Presence Watcher - holds one gateway connection and mirrors the presence
//! of a fixed watch-list to an external display program.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod gateway;
mod presence;
mod renderer;

use config::Config;
use gateway::GatewayClient;
use presence::PresenceTracker;
use renderer::ProcessRenderer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set PRESENCE__GATEWAY__URL and PRESENCE__GATEWAY__CREDENTIAL environment variables.",
            e
        )
    })?;
    tracing::info!(
        "Starting presence-watcher: {} entities, {} groups",
        config.watch.entities.len(),
        config.watch.groups.len()
    );

    let tracker = PresenceTracker::from_config(&config.watch);
    let renderer = Arc::new(ProcessRenderer::new(config.renderer.command.clone()));
    let mut client = GatewayClient::new(config.gateway.clone(), tracker, renderer);

    client
        .run_until_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await;

    tracing::info!("shutdown complete");
    Ok(())
}
