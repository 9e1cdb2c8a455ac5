use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{FluxoraError, FluxoraResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub services: ServicesConfig,
    pub gemini: GeminiConfig,
    pub deepgram: DeepgramConfig,
    pub vector_store: VectorStoreConfig,
    pub partitioning: PartitioningConfig,
    pub retrieval: RetrievalConfig,
    pub image: ImageConfig,
    pub media: MediaConfig,
    pub sessions: SessionStoreConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

/// Ports each service binds to, and the URLs the gateway reaches them on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub document_processing_port: u16,
    pub quiz_port: u16,
    pub localization_port: u16,
    pub flowchart_port: u16,
    pub video_summary_port: u16,
    pub document_processing_url: String,
    pub quiz_url: String,
    pub localization_url: String,
    pub flowchart_url: String,
    pub video_summary_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub chat_model_best: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub max_tokens: Option<u32>,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub timeout_seconds: u64,
    pub max_requests_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepgramConfig {
    pub api_url: String,
    pub api_key: String,
    pub punctuate: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    Chroma,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
    pub url: String,
    pub tenant: String,
    pub database: String,
    pub collection_name: String,
    pub embedding_batch_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionBackend {
    Unstructured,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitioningConfig {
    pub backend: PartitionBackend,
    pub api_url: String,
    pub api_key: String,
    pub strategy: String,
    pub chunking_strategy: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks fetched per chat query
    pub k: usize,
    pub max_results: usize,
    /// Messages of prior conversation included in a chat prompt
    pub history_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub supported_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub yt_dlp_path: String,
    pub download_dir: String,
    pub transcript_dir: String,
    pub min_transcript_chars: usize,
}

/// Bounds on the in-memory sessions, documents and quizzes a service holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStoreConfig {
    pub max_entries: usize,
    /// Entries idle this long are dropped by the sweep
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub metrics_enabled: bool,
    pub health_check_timeout_seconds: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with FLUXORA prefix
            .add_source(Environment::with_prefix("FLUXORA").separator("__"));

        let mut config: AppConfig = config.build()?.try_deserialize()?;
        config.apply_well_known_env();
        Ok(config)
    }

    /// `GEMINI_API_KEY` / `DEEPGRAM_API_KEY` / `UNSTRUCTURED_API_KEY` fill keys left empty by the layered sources.
    fn apply_well_known_env(&mut self) {
        let fill = |slot: &mut String, var: &str| {
            if slot.trim().is_empty() {
                if let Ok(value) = env::var(var) {
                    *slot = value.trim().to_string();
                }
            }
        };

        fill(&mut self.gemini.api_key, "GEMINI_API_KEY");
        fill(&mut self.deepgram.api_key, "DEEPGRAM_API_KEY");
        fill(&mut self.partitioning.api_key, "UNSTRUCTURED_API_KEY");
    }

    /// Every service needs the LLM.
    pub fn validate(&self) -> FluxoraResult<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(FluxoraError::configuration(
                "GEMINI_API_KEY environment variable is required",
            ));
        }
        if self.partitioning.chunk_overlap >= self.partitioning.chunk_size {
            return Err(FluxoraError::configuration(
                "partitioning.chunk_overlap must be smaller than partitioning.chunk_size",
            ));
        }
        if self.sessions.max_entries == 0 || self.sessions.sweep_interval_seconds == 0 {
            return Err(FluxoraError::configuration(
                "sessions.max_entries and sessions.sweep_interval_seconds must be positive",
            ));
        }
        Ok(())
    }

    pub fn validate_transcription(&self) -> FluxoraResult<()> {
        if self.deepgram.api_key.trim().is_empty() {
            return Err(FluxoraError::configuration(
                "DEEPGRAM_API_KEY environment variable is required",
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 64 * 1024 * 1024, // 64MB, several PDFs per upload
                timeout_seconds: 300,
            },
            services: ServicesConfig {
                document_processing_port: 8083,
                quiz_port: 8084,
                localization_port: 8085,
                flowchart_port: 8086,
                video_summary_port: 8087,
                document_processing_url: "http://localhost:8083".to_string(),
                quiz_url: "http://localhost:8084".to_string(),
                localization_url: "http://localhost:8085".to_string(),
                flowchart_url: "http://localhost:8086".to_string(),
                video_summary_url: "http://localhost:8087".to_string(),
            },
            gemini: GeminiConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key: String::new(),
                chat_model: "gemini-2.5-flash".to_string(),
                chat_model_best: "gemini-2.5-pro".to_string(),
                vision_model: "gemini-2.5-flash".to_string(),
                embedding_model: "models/embedding-001".to_string(),
                max_tokens: None,
                max_retries: 2,
                retry_base_delay_ms: 1000,
                timeout_seconds: 120,
                max_requests_per_minute: 10,
            },
            deepgram: DeepgramConfig {
                api_url: "https://api.deepgram.com/v1".to_string(),
                api_key: String::new(),
                punctuate: true,
                timeout_seconds: 300,
            },
            vector_store: VectorStoreConfig {
                backend: VectorStoreBackend::Chroma,
                url: "http://localhost:8000".to_string(),
                tenant: "default_tenant".to_string(),
                database: "default_database".to_string(),
                collection_name: "docs".to_string(),
                embedding_batch_size: 100,
                timeout_seconds: 30,
            },
            partitioning: PartitioningConfig {
                backend: PartitionBackend::Unstructured,
                api_url: "https://api.unstructuredapp.io/general/v0/general".to_string(),
                api_key: String::new(),
                strategy: "hi_res".to_string(),
                chunking_strategy: "by_title".to_string(),
                chunk_size: 1000,
                chunk_overlap: 200,
                timeout_seconds: 300,
            },
            retrieval: RetrievalConfig {
                k: 4,
                max_results: 5,
                history_window: 5,
            },
            image: ImageConfig {
                max_width: 1024,
                max_height: 1024,
                supported_formats: vec![
                    "JPEG".to_string(),
                    "PNG".to_string(),
                    "WEBP".to_string(),
                    "GIF".to_string(),
                ],
            },
            media: MediaConfig {
                yt_dlp_path: "yt-dlp".to_string(),
                download_dir: "downloads".to_string(),
                transcript_dir: "transcripts".to_string(),
                min_transcript_chars: 50,
            },
            sessions: SessionStoreConfig {
                max_entries: 1000,
                ttl_seconds: 24 * 60 * 60,
                sweep_interval_seconds: 300,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file_path: None,
            },
            monitoring: MonitoringConfig {
                metrics_enabled: true,
                health_check_timeout_seconds: 5,
            },
        }
    }
}
