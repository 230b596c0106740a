use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use warden::config::Config;
use warden::discord;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load("config").context("failed to load config/")?;
    tracing::info!("booting...");

    discord::run(config).await
}
