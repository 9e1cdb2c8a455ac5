//! Fluxora Flowchart Service
//!
//! Natural-language process descriptions to Mermaid diagrams.

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use fluxora_llm::{GeminiClient, PromptLibrary};
use fluxora_utils::{metrics_handler, AppConfig, FluxoraResult};
use serde_json::json;
use std::sync::Arc;

pub mod generator;
pub mod handlers;

pub use generator::{render_html, strip_code_fences, FlowchartGenerator};

pub const SERVICE_NAME: &str = "flowchart";

#[derive(Clone)]
pub struct AppState {
    pub generator: FlowchartGenerator,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> FluxoraResult<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        Ok(Self {
            generator: FlowchartGenerator::new(gemini, Arc::new(PromptLibrary::new()?)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/flowcharts", post(handlers::generate_flowchart))
        .route("/api/v1/flowcharts/help", post(handlers::help))
        .route("/api/v1/flowcharts/render", post(handlers::render))
        .route("/api/v1/flowcharts/examples", get(handlers::list_examples))
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
