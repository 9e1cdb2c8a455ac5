use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FluxoraError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Document processing error: {message}")]
    DocumentProcessing { message: String },

    #[error("LLM error: {message}")]
    Llm { message: String },

    #[error("Embedding error: {message}")]
    Embedding { message: String },

    #[error("Vector store error: {message}")]
    VectorStore { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Download error: {message}")]
    Download { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl FluxoraError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn document_processing(message: impl Into<String>) -> Self {
        Self::DocumentProcessing {
            message: message.into(),
        }
    }

    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    pub fn transcription(message: impl Into<String>) -> Self {
        Self::Transcription {
            message: message.into(),
        }
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DocumentProcessing { .. } => "DOCUMENT_PROCESSING_ERROR",
            Self::Llm { .. } => "LLM_ERROR",
            Self::Embedding { .. } => "EMBEDDING_ERROR",
            Self::VectorStore { .. } => "VECTOR_STORE_ERROR",
            Self::Transcription { .. } => "TRANSCRIPTION_ERROR",
            Self::Download { .. } => "DOWNLOAD_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::RateLimit { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::DocumentProcessing { .. } => 422,
            Self::Llm { .. } => 502,
            Self::Embedding { .. } => 502,
            Self::VectorStore { .. } => 502,
            Self::Transcription { .. } => 502,
            Self::Download { .. } => 502,
            Self::Configuration { .. } => 500,
            Self::ExternalService { .. } => 502,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::RateLimit { .. } => 429,
            Self::Internal { .. } => 500,
        }
    }

    /// Worth retrying the same call later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit { .. } | Self::ExternalService { .. })
    }
}

pub type FluxoraResult<T> = Result<T, FluxoraError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<FluxoraError> for ErrorResponse {
    fn from(error: FluxoraError) -> Self {
        let message = match &error {
            FluxoraError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message,
            details: None,
        }
    }
}

impl IntoResponse for FluxoraError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Request rejected");
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

// Conversion from common error types
impl From<reqwest::Error> for FluxoraError {
    fn from(error: reqwest::Error) -> Self {
        Self::external_service("HTTP Client", error.to_string())
    }
}

impl From<serde_json::Error> for FluxoraError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<std::io::Error> for FluxoraError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for FluxoraError {
    fn from(error: axum::extract::multipart::MultipartError) -> Self {
        Self::validation("upload", error.to_string())
    }
}
