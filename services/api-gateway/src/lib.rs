//! Fluxora API Gateway
//!
//! Front door for the Fluxora services: aggregated health, metrics, the
//! service directory and credits.

use axum::{middleware::from_fn, routing::get, Router};
use fluxora_utils::{metrics_handler, AppConfig, FluxoraError, FluxoraResult, ServicesConfig};
use std::sync::Arc;
use std::time::Duration;

pub mod handlers;
pub mod middleware;

pub use middleware::{request_id_middleware, REQUEST_ID_HEADER};

pub const SERVICE_NAME: &str = "api-gateway";

/// A downstream service the gateway knows about.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub name: &'static str,
    pub url: String,
    pub features: &'static [&'static str],
}

impl ServiceEndpoint {
    pub fn all(services: &ServicesConfig) -> Vec<Self> {
        vec![
            Self {
                name: "document-processing",
                url: services.document_processing_url.clone(),
                features: &["pdf upload", "chat with documents", "image analysis"],
            },
            Self {
                name: "quiz",
                url: services.quiz_url.clone(),
                features: &["topic extraction", "quiz generation", "grading"],
            },
            Self {
                name: "localization",
                url: services.localization_url.clone(),
                features: &["document type detection", "localized summaries"],
            },
            Self {
                name: "flowchart",
                url: services.flowchart_url.clone(),
                features: &["mermaid generation", "html rendering", "troubleshooting"],
            },
            Self {
                name: "video-summary",
                url: services.video_summary_url.clone(),
                features: &["youtube transcription", "standard summary", "enhanced analysis"],
            },
        ]
    }
}

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub services: Arc<Vec<ServiceEndpoint>>,
}

impl AppState {
    pub fn new(services: Vec<ServiceEndpoint>, health_check_timeout: Duration) -> FluxoraResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(health_check_timeout)
            .build()
            .map_err(|e| FluxoraError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            services: Arc::new(services),
        })
    }

    pub fn from_config(config: &AppConfig) -> FluxoraResult<Self> {
        Self::new(
            ServiceEndpoint::all(&config.services),
            Duration::from_secs(config.monitoring.health_check_timeout_seconds),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/health/detailed", get(handlers::detailed_health_check))
        .route("/api/v1/services", get(handlers::list_services))
        .route("/api/v1/credits", get(handlers::credits))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
