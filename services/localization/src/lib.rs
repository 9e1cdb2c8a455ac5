//! Fluxora Localization Service
//!
//! Culturally adapted summaries of uploaded PDFs in 54 target languages.

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use fluxora_documents::PdfProcessor;
use fluxora_llm::{GeminiClient, PromptLibrary};
use fluxora_utils::{metrics_handler, AppConfig, FluxoraResult};
use fluxora_vectorstore::{build_store, Index};
use serde_json::json;
use std::sync::Arc;

pub mod handlers;
pub mod localizer;

pub use localizer::{detect_document_type, localization_strategy, Localizer};

pub const SERVICE_NAME: &str = "localization";

#[derive(Clone)]
pub struct AppState {
    pub processor: PdfProcessor,
    pub index: Index,
    pub localizer: Localizer,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> FluxoraResult<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        Ok(Self {
            processor: PdfProcessor::from_config(config, gemini.clone())?,
            index: Index::new(
                build_store(&config.vector_store)?,
                gemini.clone(),
                config.vector_store.embedding_batch_size,
            ),
            localizer: Localizer::new(gemini, Arc::new(PromptLibrary::new()?)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/localization", post(handlers::localize_document))
        .route("/api/v1/localization/languages", get(handlers::list_languages))
        .route("/api/v1/localization/contexts", get(handlers::list_contexts))
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
