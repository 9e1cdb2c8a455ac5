//! Unstructured partition API client.

use async_trait::async_trait;
use fluxora_utils::{FluxoraError, FluxoraResult, PartitioningConfig};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::{Partitioner, RawElement};

pub struct UnstructuredPartitioner {
    client: Client,
    config: PartitioningConfig,
}

impl UnstructuredPartitioner {
    pub fn new(config: PartitioningConfig) -> FluxoraResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FluxoraError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn form(&self, filename: &str, data: &[u8]) -> FluxoraResult<Form> {
        let file = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| FluxoraError::internal(e.to_string()))?;

        Ok(Form::new()
            .part("files", file)
            .text("strategy", self.config.strategy.clone())
            .text("infer_table_structure", "true")
            .text("extract_image_block_types", r#"["Image", "Table"]"#)
            .text("chunking_strategy", self.config.chunking_strategy.clone())
            .text("max_characters", self.config.chunk_size.to_string())
            .text("overlap", self.config.chunk_overlap.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiElement {
    #[serde(rename = "type")]
    category: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl From<ApiElement> for RawElement {
    fn from(element: ApiElement) -> Self {
        let mut metadata = element.metadata;
        let take_string = |metadata: &mut Map<String, Value>, key: &str| match metadata.remove(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        let image_base64 = take_string(&mut metadata, "image_base64");
        let text_as_html = metadata
            .get("text_as_html")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let page_number = metadata
            .get("page_number")
            .and_then(Value::as_u64)
            .map(|n| n as u32);

        Self {
            category: element.category,
            text: element.text,
            text_as_html,
            image_base64,
            page_number,
            metadata,
        }
    }
}

pub(crate) fn parse_elements(body: &str) -> FluxoraResult<Vec<RawElement>> {
    let elements: Vec<ApiElement> = serde_json::from_str(body).map_err(|e| {
        FluxoraError::document_processing(format!("Unexpected partition response: {}", e))
    })?;
    Ok(elements.into_iter().map(RawElement::from).collect())
}

#[async_trait]
impl Partitioner for UnstructuredPartitioner {
    async fn partition(&self, filename: &str, data: &[u8]) -> FluxoraResult<Vec<RawElement>> {
        debug!(filename, bytes = data.len(), strategy = %self.config.strategy, "Partitioning PDF");

        let mut request = self
            .client
            .post(&self.config.api_url)
            .header("accept", "application/json")
            .multipart(self.form(filename, data)?);
        if !self.config.api_key.is_empty() {
            request = request.header("unstructured-api-key", &self.config.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FluxoraError::external_service("Unstructured", e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FluxoraError::external_service("Unstructured", e.to_string()))?;
        if !status.is_success() {
            return Err(FluxoraError::external_service(
                "Unstructured",
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let elements = parse_elements(&body)?;
        info!(filename, count = elements.len(), "Partitioned PDF");
        Ok(elements)
    }

    fn name(&self) -> &'static str {
        "unstructured"
    }
}
