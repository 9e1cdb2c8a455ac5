use async_trait::async_trait;
use fluxora_utils::FluxoraResult;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{ScoredRecord, VectorRecord, VectorStore};

/// Brute-force cosine search over records held in memory.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add(&self, records: Vec<VectorRecord>) -> FluxoraResult<()> {
        let mut stored = self.records.write().await;
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> FluxoraResult<Vec<ScoredRecord>> {
        let stored = self.records.read().await;
        let mut scored: Vec<(f32, &VectorRecord)> = stored
            .iter()
            .map(|r| (1.0 - cosine_similarity(embedding, &r.embedding), r))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, record)| ScoredRecord {
                id: record.id.clone(),
                document: record.document.clone(),
                metadata: record
                    .metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect::<Map<String, Value>>(),
                distance: Some(distance),
            })
            .collect())
    }

    async fn count(&self) -> FluxoraResult<usize> {
        Ok(self.records.read().await.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
