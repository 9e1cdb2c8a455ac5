use anyhow::Result;
use fluxora_api_gateway::{router, AppState, SERVICE_NAME};
use fluxora_utils::{init_logging, serve_on, with_common_layers, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    init_logging(SERVICE_NAME, &config.logging)?;
    info!("Starting Fluxora API Gateway");

    let state = AppState::from_config(&config)?;
    for service in state.services.iter() {
        info!(service = service.name, url = %service.url, "Registered downstream service");
    }

    let app = with_common_layers(router(state), &config.server);
    serve_on(app, config.server.port, "API Gateway").await
}
