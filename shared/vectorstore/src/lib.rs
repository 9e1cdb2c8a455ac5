//! # Fluxora vector store access
//!
//! [`VectorStore`] hides the backend (Chroma over HTTP, or an in-process
//! store for tests and local runs). [`Index`] sits on top and turns
//! extracted elements into embedded, searchable chunks.

use async_trait::async_trait;
use fluxora_utils::{FluxoraResult, VectorStoreBackend, VectorStoreConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub mod chroma;
pub mod index;
pub mod memory;

pub use chroma::ChromaStore;
pub use index::Index;
pub use memory::InMemoryStore;

/// A chunk ready to be written: text, its embedding and flat metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub document: String,
    pub metadata: Map<String, Value>,
    /// Smaller is closer
    pub distance: Option<f32>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert records, replacing any with the same id.
    async fn add(&self, records: Vec<VectorRecord>) -> FluxoraResult<()>;

    /// Nearest `k` records to `embedding`, closest first.
    async fn query(&self, embedding: &[f32], k: usize) -> FluxoraResult<Vec<ScoredRecord>>;

    async fn count(&self) -> FluxoraResult<usize>;

    fn backend_name(&self) -> &'static str;
}

pub fn build_store(config: &VectorStoreConfig) -> FluxoraResult<Arc<dyn VectorStore>> {
    Ok(match config.backend {
        VectorStoreBackend::Chroma => Arc::new(ChromaStore::new(config.clone())?),
        VectorStoreBackend::Memory => Arc::new(InMemoryStore::new()),
    })
}
