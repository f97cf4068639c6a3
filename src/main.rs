use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photogram::api;
use photogram::config::Config;
use photogram::db::init_database;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,photogram=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::get();
    info!(
        "Initialized configuration, serving on {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database
    let db = Arc::new(init_database().await?);
    info!("Connected to database");

    // Start API server; runs until a shutdown signal arrives
    api::start_api_server(db).await?;

    info!("Photogram shutdown complete");
    Ok(())
}
