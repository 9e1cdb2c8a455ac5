use anyhow::Result;
use fluxora_document_processing::{router, AppState, SERVICE_NAME};
use fluxora_utils::{init_logging, serve_on, with_common_layers, AppConfig};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    init_logging(SERVICE_NAME, &config.logging)?;
    info!("Starting Fluxora Document Processing Service");

    config.validate()?;
    let state = AppState::from_config(&config)?;
    state.spawn_sweeps(Duration::from_secs(config.sessions.sweep_interval_seconds));
    info!(
        vector_store = ?config.vector_store.backend,
        partitioner = ?config.partitioning.backend,
        "Document pipeline ready"
    );

    let app = with_common_layers(router(state), &config.server);
    serve_on(
        app,
        config.services.document_processing_port,
        "Document Processing Service",
    )
    .await
}
