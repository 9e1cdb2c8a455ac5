//! # Fluxora PDF processing
//!
//! Partitioning is delegated to the Unstructured API, with a local
//! text-only fallback. [`PdfProcessor`] turns the partitioner's raw output
//! into typed [`fluxora_models::Element`]s, describing images with the
//! vision model along the way.

use async_trait::async_trait;
use fluxora_utils::{FluxoraResult, PartitionBackend, PartitioningConfig};
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod image_analysis;
pub mod local;
pub mod processor;
pub mod unstructured;

pub use image_analysis::{ImageAnalyzer, IMAGE_FALLBACK_DESCRIPTION};
pub use local::LocalPartitioner;
pub use processor::PdfProcessor;
pub use unstructured::UnstructuredPartitioner;

/// One element as the partitioner reports it, before typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawElement {
    pub category: Option<String>,
    pub text: String,
    pub text_as_html: Option<String>,
    pub image_base64: Option<String>,
    pub page_number: Option<u32>,
    pub metadata: Map<String, Value>,
}

impl RawElement {
    pub fn text(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            text: text.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait Partitioner: Send + Sync {
    async fn partition(&self, filename: &str, data: &[u8]) -> FluxoraResult<Vec<RawElement>>;

    fn name(&self) -> &'static str;
}

pub fn build_partitioner(config: &PartitioningConfig) -> FluxoraResult<Arc<dyn Partitioner>> {
    Ok(match config.backend {
        PartitionBackend::Unstructured => Arc::new(UnstructuredPartitioner::new(config.clone())?),
        PartitionBackend::Local => Arc::new(LocalPartitioner::new(
            config.chunk_size,
            config.chunk_overlap,
        )),
    })
}
