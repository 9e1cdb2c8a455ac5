//! Fluxora Quiz Service
//!
//! Turns an uploaded PDF into topic-based quizzes and grades submissions.

use axum::{
    response::Json,
    routing::{delete, get, post},
    Router,
};
use fluxora_documents::PdfProcessor;
use fluxora_llm::{GeminiClient, PromptLibrary};
use fluxora_models::{ProcessedDocument, Quiz};
use fluxora_utils::{
    metrics_handler, spawn_expiry_sweep, AppConfig, BoundedMap, FluxoraResult, SessionStoreConfig,
    SharedMap,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub mod evaluation;
pub mod generator;
pub mod handlers;

pub use evaluation::{evaluate_answer, grade};
pub use generator::QuizGenerator;

pub const SERVICE_NAME: &str = "quiz";

/// A processed PDF with the topics offered for it
#[derive(Debug, Clone)]
pub struct QuizDocument {
    pub document: ProcessedDocument,
    pub topics: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub processor: PdfProcessor,
    pub generator: QuizGenerator,
    pub documents: SharedMap<Uuid, QuizDocument>,
    pub quizzes: SharedMap<Uuid, Quiz>,
}

impl AppState {
    pub fn new(processor: PdfProcessor, generator: QuizGenerator, limits: &SessionStoreConfig) -> Self {
        Self {
            processor,
            generator,
            documents: BoundedMap::shared(limits),
            quizzes: BoundedMap::shared(limits),
        }
    }

    pub fn spawn_sweeps(&self, period: Duration) {
        spawn_expiry_sweep("quiz_documents", self.documents.clone(), period);
        spawn_expiry_sweep("quizzes", self.quizzes.clone(), period);
    }

    pub fn from_config(config: &AppConfig) -> FluxoraResult<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        let processor = PdfProcessor::from_config(config, gemini.clone())?;
        let generator = QuizGenerator::new(gemini, Arc::new(PromptLibrary::new()?));
        Ok(Self::new(processor, generator, &config.sessions))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1/quiz", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/documents", post(handlers::upload_document))
        .route("/documents/:id", delete(handlers::delete_document))
        .route("/documents/:id/quizzes", post(handlers::create_quiz))
        .route(
            "/quizzes/:id",
            get(handlers::get_quiz).delete(handlers::delete_quiz),
        )
        .route("/quizzes/:id/submit", post(handlers::submit_quiz))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
