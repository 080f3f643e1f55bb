use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use weatherdeck::api::AppState;
use weatherdeck::config::AppConfig;
use weatherdeck::gateway::Gateway;
use weatherdeck::provider::GoogleProvider;
use weatherdeck::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let provider = GoogleProvider::new(config.google_api_key.clone().unwrap_or_default());
    let gateway = Arc::new(Gateway::new(Arc::new(provider)));
    let state = AppState { gateway };

    web::run(config.port, state).await?;
    Ok(())
}
