use anyhow::Result;
use fluxora_utils::{init_logging, serve_on, with_common_layers, AppConfig};
use fluxora_video_summary::{router, AppState, SERVICE_NAME};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    init_logging(SERVICE_NAME, &config.logging)?;
    info!("Starting Fluxora Video Summary Service");

    config.validate()?;
    if let Err(e) = config.validate_transcription() {
        warn!(error = %e, "Video summaries are unavailable until a Deepgram key is configured");
    }
    let state = AppState::from_config(&config)?;
    info!(yt_dlp = %config.media.yt_dlp_path, download_dir = %config.media.download_dir, "Media pipeline ready");

    let app = with_common_layers(router(state), &config.server);
    serve_on(app, config.services.video_summary_port, "Video Summary Service").await
}
