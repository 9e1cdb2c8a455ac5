//! Fluxora Document Processing Service
//!
//! PDF analysis chat: upload PDFs into a session, index their text, tables
//! and images, then ask questions answered from the retrieved chunks.

use axum::{
    response::Json,
    routing::{delete, get, post},
    Router,
};
use fluxora_documents::PdfProcessor;
use fluxora_llm::{GeminiClient, PromptLibrary};
use fluxora_models::{ChatSession, ProcessedDocument};
use fluxora_utils::{
    metrics_handler, spawn_expiry_sweep, AppConfig, BoundedMap, FluxoraResult, SessionStoreConfig,
    SharedMap,
};
use fluxora_vectorstore::{build_store, Index};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub mod chat;
pub mod handlers;

use chat::ChatEngine;

pub const SERVICE_NAME: &str = "document-processing";

#[derive(Clone)]
pub struct AppState {
    pub processor: PdfProcessor,
    pub index: Index,
    pub chat: ChatEngine,
    pub sessions: SharedMap<Uuid, ChatSession>,
    pub documents: SharedMap<Uuid, ProcessedDocument>,
    pub retrieval_k: usize,
}

impl AppState {
    pub fn new(
        processor: PdfProcessor,
        index: Index,
        chat: ChatEngine,
        retrieval_k: usize,
        limits: &SessionStoreConfig,
    ) -> Self {
        Self {
            processor,
            index,
            chat,
            sessions: BoundedMap::shared(limits),
            documents: BoundedMap::shared(limits),
            retrieval_k: retrieval_k.max(1),
        }
    }

    /// Background expiry of idle sessions and documents.
    pub fn spawn_sweeps(&self, period: Duration) {
        spawn_expiry_sweep("sessions", self.sessions.clone(), period);
        spawn_expiry_sweep("documents", self.documents.clone(), period);
    }

    /// Gemini for chat, vision and embeddings; store and partitioner per config.
    pub fn from_config(config: &AppConfig) -> FluxoraResult<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        let processor = PdfProcessor::from_config(config, gemini.clone())?;
        let index = Index::new(
            build_store(&config.vector_store)?,
            gemini.clone(),
            config.vector_store.embedding_batch_size,
        );
        let chat = ChatEngine::new(
            gemini,
            Arc::new(PromptLibrary::new()?),
            config.retrieval.history_window,
            &config.image,
        );

        Ok(Self::new(
            processor,
            index,
            chat,
            config.retrieval.k.min(config.retrieval.max_results),
            &config.sessions,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", delete(handlers::delete_session))
        .route("/sessions/:id/documents", post(handlers::upload_documents))
        .route("/sessions/:id/messages", get(handlers::get_messages))
        .route("/sessions/:id/chat", post(handlers::chat))
        .route("/images/analyze", post(handlers::analyze_image))
        .route(
            "/documents/:id",
            get(handlers::get_document).delete(handlers::delete_document),
        )
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
