use fluxora_llm::Embedder;
use fluxora_models::{ChunkMetadata, Element, RetrievedChunk};
use fluxora_utils::{metrics, FluxoraResult};
use std::sync::Arc;
use tracing::info;

use crate::{VectorRecord, VectorStore};

/// Embeds elements into a vector store and answers similarity queries.
#[derive(Clone)]
pub struct Index {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl Index {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            store,
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Index every element. Returns the number of chunks written.
    pub async fn add_documents(&self, elements: &[Element]) -> FluxoraResult<usize> {
        if elements.is_empty() {
            return Ok(0);
        }

        let mut written = 0;
        for batch in elements.chunks(self.batch_size) {
            let documents: Vec<String> = batch.iter().map(Element::page_content).collect();
            let embeddings = self.embedder.embed_documents(&documents).await?;

            let records: Vec<VectorRecord> = batch
                .iter()
                .zip(documents)
                .zip(embeddings)
                .map(|((element, document), embedding)| VectorRecord {
                    id: element.id.clone(),
                    embedding,
                    document,
                    metadata: ChunkMetadata::from(element).to_map(),
                })
                .collect();

            written += records.len();
            self.store.add(records).await?;
        }

        metrics::ELEMENTS_INDEXED.inc_by(written as u64);
        info!(count = written, backend = self.store.backend_name(), "Added documents to vector store");
        Ok(written)
    }

    pub async fn query(&self, text: &str, k: usize) -> FluxoraResult<Vec<RetrievedChunk>> {
        let embedding = self.embedder.embed_query(text).await?;
        let records = self.store.query(&embedding, k).await?;

        Ok(records
            .into_iter()
            .map(|record| RetrievedChunk {
                content: record.document,
                metadata: ChunkMetadata::from_map(&record.metadata),
                distance: record.distance,
            })
            .collect())
    }
}
