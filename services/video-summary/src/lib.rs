//! Fluxora Video Summary Service
//!
//! YouTube audio is downloaded with yt-dlp, transcribed by Deepgram and
//! summarized by Gemini. Plain text can be summarized directly.

use axum::{response::Json, routing::get, routing::post, Router};
use fluxora_llm::{GeminiClient, PromptLibrary};
use fluxora_utils::{metrics_handler, AppConfig, FluxoraResult, MediaConfig};
use serde_json::json;
use std::sync::Arc;

pub mod download;
pub mod handlers;
pub mod summarizer;
pub mod transcribe;

pub use download::{extract_video_id, AudioSource, YtDlp};
pub use summarizer::{parse_enhanced_summary, Summarizer};
pub use transcribe::{youtube_to_transcript, DeepgramTranscriber, Transcriber};

pub const SERVICE_NAME: &str = "video-summary";

#[derive(Clone)]
pub struct AppState {
    pub audio: Arc<dyn AudioSource>,
    pub transcriber: Arc<dyn Transcriber>,
    pub summarizer: Summarizer,
    pub media: MediaConfig,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> FluxoraResult<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        Ok(Self {
            audio: Arc::new(YtDlp::new(
                config.media.yt_dlp_path.clone(),
                config.media.download_dir.clone(),
            )),
            transcriber: Arc::new(DeepgramTranscriber::new(config.deepgram.clone())?),
            summarizer: Summarizer::new(gemini, Arc::new(PromptLibrary::new()?)),
            media: config.media.clone(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/videos/summarize", post(handlers::summarize_video))
        .route("/api/v1/texts/summarize", post(handlers::summarize_text))
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
