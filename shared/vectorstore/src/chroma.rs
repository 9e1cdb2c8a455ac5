//! Chroma v2 REST backend.

use async_trait::async_trait;
use fluxora_utils::{FluxoraError, FluxoraResult, VectorStoreConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{ScoredRecord, VectorRecord, VectorStore};

pub struct ChromaStore {
    client: Client,
    config: VectorStoreConfig,
    collection_id: OnceCell<String>,
}

impl ChromaStore {
    pub fn new(config: VectorStoreConfig) -> FluxoraResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FluxoraError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            collection_id: OnceCell::new(),
        })
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.config.url.trim_end_matches('/'),
            self.config.tenant,
            self.config.database
        )
    }

    /// Collection id, created on first use.
    async fn collection(&self) -> FluxoraResult<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .post(self.collections_url())
                    .json(&CreateCollection {
                        name: &self.config.collection_name,
                        get_or_create: true,
                    })
                    .send()
                    .await
                    .map_err(|e| FluxoraError::vector_store(format!("Chroma unreachable: {}", e)))?;

                let collection: Collection = check(response).await?.json().await.map_err(|e| {
                    FluxoraError::vector_store(format!("Invalid collection response: {}", e))
                })?;
                info!(
                    collection = %self.config.collection_name,
                    id = %collection.id,
                    "Chroma collection ready"
                );
                Ok::<_, FluxoraError>(collection.id)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn collection_url(&self, action: &str) -> FluxoraResult<String> {
        let id = self.collection().await?;
        Ok(format!("{}/{}/{}", self.collections_url(), id, action))
    }
}

async fn check(response: reqwest::Response) -> FluxoraResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(FluxoraError::vector_store(format!(
        "Chroma returned HTTP {}: {}",
        status.as_u16(),
        body
    )))
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn add(&self, records: Vec<VectorRecord>) -> FluxoraResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut body = UpsertRecords::default();
        for record in records {
            body.ids.push(record.id);
            body.embeddings.push(record.embedding);
            body.documents.push(record.document);
            body.metadatas.push(record.metadata);
        }

        debug!(count = body.ids.len(), "Upserting records into Chroma");
        let url = self.collection_url("upsert").await?;
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FluxoraError::vector_store(e.to_string()))?;
        check(response).await.map(|_| ())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> FluxoraResult<Vec<ScoredRecord>> {
        let url = self.collection_url("query").await?;
        let response = self
            .client
            .post(url)
            .json(&QueryRequest {
                query_embeddings: vec![embedding.to_vec()],
                n_results: k,
                include: ["documents", "metadatas", "distances"],
            })
            .send()
            .await
            .map_err(|e| FluxoraError::vector_store(e.to_string()))?;

        let result: QueryResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| FluxoraError::vector_store(format!("Invalid query response: {}", e)))?;
        Ok(result.into_records())
    }

    async fn count(&self) -> FluxoraResult<usize> {
        let url = self.collection_url("count").await?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FluxoraError::vector_store(e.to_string()))?;
        check(response)
            .await?
            .json::<usize>()
            .await
            .map_err(|e| FluxoraError::vector_store(format!("Invalid count response: {}", e)))
    }

    fn backend_name(&self) -> &'static str {
        "chroma"
    }
}

#[derive(Debug, Serialize)]
struct CreateCollection<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Debug, Deserialize)]
struct Collection {
    id: String,
}

#[derive(Debug, Default, Serialize)]
struct UpsertRecords {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<String>,
    metadatas: Vec<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: [&'static str; 3],
}

/// Results are nested one level per query embedding.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

impl QueryResponse {
    fn into_records(self) -> Vec<ScoredRecord> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let mut documents = self
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default()
            .into_iter();
        let mut metadatas = self
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default()
            .into_iter();
        let mut distances = self
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default()
            .into_iter();

        ids.into_iter()
            .map(|id| ScoredRecord {
                id,
                document: documents.next().flatten().unwrap_or_default(),
                metadata: metadatas.next().flatten().unwrap_or_default(),
                distance: distances.next().flatten(),
            })
            .collect()
    }
}
