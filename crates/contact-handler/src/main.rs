//! Contact Handler - Main Entry Point

use contact_handler::{build_router, AppState, HandlerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Contact Handler v{}", env!("CARGO_PKG_VERSION"));

    // Load config, then let the environment override it
    let config_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| "/etc/contact-handler/config.json".into());

    let config = HandlerConfig::load(&config_path)
        .unwrap_or_else(|_| {
            tracing::warn!("Config not found, using defaults");
            HandlerConfig::default()
        })
        .apply_env()?;
    config.log_summary();

    let app = build_router(AppState::from_config(&config)?);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
