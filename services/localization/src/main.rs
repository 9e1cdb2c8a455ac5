use anyhow::Result;
use fluxora_localization::{router, AppState, SERVICE_NAME};
use fluxora_utils::{init_logging, serve_on, with_common_layers, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    init_logging(SERVICE_NAME, &config.logging)?;
    info!("Starting Fluxora Localization Service");

    config.validate()?;
    let state = AppState::from_config(&config)?;

    let app = with_common_layers(router(state), &config.server);
    serve_on(app, config.services.localization_port, "Localization Service").await
}
