use items_api_rust::config::AppConfig;
use items_api_rust::server::{self, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;
    tracing::info!("Starting Items API in {:?} mode", config.environment);

    let state = AppState::from_config(&config).await?;
    server::serve(&config, state).await
}
