pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod metrics;
pub mod text;
pub mod upload;
pub mod server;
pub mod store;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use metrics::{gather_metrics, metrics_handler};
pub use text::*;
pub use server::{serve_on, with_common_layers};
pub use store::{spawn_expiry_sweep, BoundedMap, SharedMap};
pub use upload::{safe_file_name, UploadForm, UploadedFile};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.gemini.chat_model, "gemini-2.5-flash");
        assert_eq!(config.gemini.chat_model_best, "gemini-2.5-pro");
        assert_eq!(config.gemini.max_retries, 2);
        assert_eq!(config.vector_store.collection_name, "docs");
        assert_eq!(config.partitioning.chunk_size, 1000);
        assert_eq!(config.partitioning.chunk_overlap, 200);
        assert_eq!(config.retrieval.k, 4);
        assert_eq!(config.image.max_width, 1024);
        assert_eq!(config.sessions.max_entries, 1000);
        assert_eq!(config.sessions.ttl_seconds, 86_400);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.gemini.api_key = String::new();
        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");

        config.gemini.api_key = "key".to_string();
        assert!(config.validate().is_ok());

        config.partitioning.chunk_overlap = config.partitioning.chunk_size;
        assert!(config.validate().is_err());

        config.partitioning.chunk_overlap = 200;
        assert!(config.validate().is_ok());
        config.sessions.max_entries = 0;
        assert!(config.validate().is_err());

        assert!(config.validate_transcription().is_err());
    }

    #[test]
    fn test_error_handling() {
        let error = FluxoraError::validation("test_field", "test message");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 400);

        let error = FluxoraError::llm("quota exhausted");
        assert_eq!(error.http_status_code(), 502);
        assert!(!error.is_transient());
        assert!(FluxoraError::rate_limit("slow down").is_transient());
    }

    #[test]
    fn test_error_response_body() {
        let response = ErrorResponse::from(FluxoraError::validation("query", "Query is empty"));
        assert_eq!(response.code, "VALIDATION_ERROR");
        assert_eq!(response.message, "Query is empty");

        let response = ErrorResponse::from(FluxoraError::not_found("session 42"));
        assert_eq!(response.message, "Not found: session 42");
    }

    #[test]
    fn test_error_into_response_status() {
        let response = FluxoraError::conflict("no documents").into_response();
        assert_eq!(response.status().as_u16(), 409);
    }

    #[test]
    fn test_metrics_exposition() {
        metrics::ELEMENTS_INDEXED.inc_by(3);
        metrics::LLM_REQUESTS
            .with_label_values(&["gemini-2.5-flash", metrics::outcome(true)])
            .inc();
        let text = gather_metrics();
        assert!(text.contains("fluxora_elements_indexed_total"));
        assert!(text.contains("fluxora_llm_requests_total"));
    }
}
