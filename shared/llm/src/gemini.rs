//! Gemini REST client
//!
//! Speaks `generateContent` for chat and vision requests and
//! `batchEmbedContents` for embeddings. Every call passes through a
//! per-minute [`RateLimiter`]. Transient failures (429 and 5xx) are retried
//! with exponential backoff, honouring `Retry-After`.

use async_trait::async_trait;
use fluxora_utils::{metrics, FluxoraError, FluxoraResult, GeminiConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::rate_limit::RateLimiter;
use crate::retry::{backoff_delay, parse_retry_after};
use crate::types::{ChatRequest, Message, ModelTier, Part};
use crate::{ChatModel, Embedder};

/// Largest batch `batchEmbedContents` accepts
const EMBED_BATCH_LIMIT: usize = 100;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    limiter: Arc<RateLimiter>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> FluxoraResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FluxoraError::configuration(format!("HTTP client: {}", e)))?;

        let limiter = Arc::new(RateLimiter::per_minute(config.max_requests_per_minute));
        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    pub fn model_name(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Chat => &self.config.chat_model,
            ModelTier::Best => &self.config.chat_model_best,
            ModelTier::Vision => &self.config.vision_model,
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.config.api_url.trim_end_matches('/'),
            model_path(model),
            method
        )
    }

    /// Rate-limited POST with retries on transient failures. Returns the
    /// successful response.
    async fn post_with_retry<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        model: &str,
    ) -> FluxoraResult<reqwest::Response> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;

        loop {
            self.limiter.acquire().await;
            let started = Instant::now();
            let result = self
                .client
                .post(url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(body)
                .send()
                .await;
            metrics::LLM_REQUEST_DURATION
                .with_label_values(&[model])
                .observe(started.elapsed().as_secs_f64());

            let response = match result {
                Ok(response) => response,
                Err(e) if attempt < max_retries => {
                    let delay = backoff_delay(attempt, self.config.retry_base_delay_ms);
                    warn!(error = %e, attempt, ?delay, model, "Gemini request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    metrics::LLM_REQUESTS
                        .with_label_values(&[model, metrics::outcome(false)])
                        .inc();
                    return Err(FluxoraError::external_service("Gemini", e.to_string()));
                }
            };

            let status = response.status();
            if status.is_success() {
                metrics::LLM_REQUESTS
                    .with_label_values(&[model, metrics::outcome(true)])
                    .inc();
                return Ok(response);
            }

            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            let error = status_error(status.as_u16(), response.text().await.unwrap_or_default());

            if error.is_transient() && attempt < max_retries {
                let delay = retry_after
                    .unwrap_or_else(|| backoff_delay(attempt, self.config.retry_base_delay_ms));
                warn!(status = status.as_u16(), attempt, ?delay, model, "Gemini returned a transient error, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            metrics::LLM_REQUESTS
                .with_label_values(&[model, metrics::outcome(false)])
                .inc();
            return Err(error);
        }
    }

    async fn embed_batch(&self, texts: &[String], task: EmbedTask) -> FluxoraResult<Vec<Vec<f32>>> {
        let model = model_path(&self.config.embedding_model);
        let url = self.endpoint(&self.config.embedding_model, "batchEmbedContents");
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_LIMIT) {
            let body = BatchEmbedRequest::new(&model, batch, task);
            let response = self
                .post_with_retry(&url, &body, &model)
                .await
                .map_err(|e| FluxoraError::embedding(e.to_string()))?;
            let parsed: BatchEmbedResponse = response
                .json()
                .await
                .map_err(|e| FluxoraError::embedding(format!("Failed to parse embeddings: {}", e)))?;

            if parsed.embeddings.len() != batch.len() {
                return Err(FluxoraError::embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    parsed.embeddings.len()
                )));
            }
            embeddings.extend(parsed.embeddings.into_iter().map(|e| e.values));
        }

        Ok(embeddings)
    }
}

/// Error for a non-success Gemini status. Quota and server errors come back
/// transient, anything else is a request the model rejected.
fn status_error(status: u16, error_text: String) -> FluxoraError {
    match status {
        429 => FluxoraError::rate_limit(format!("Gemini quota exceeded: {}", error_text)),
        code if code >= 500 => {
            FluxoraError::external_service("Gemini", format!("HTTP {}: {}", code, error_text))
        }
        code => FluxoraError::llm(format!("Gemini API error (HTTP {}): {}", code, error_text)),
    }
}

/// Gemini addresses models as `models/{name}`.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn complete(&self, request: ChatRequest) -> FluxoraResult<String> {
        let model = self.model_name(request.tier).to_string();
        let url = self.endpoint(&model, "generateContent");
        let body = GenerateContentRequest::from_chat(&request, self.config.max_tokens);

        debug!(model = %model, messages = request.messages.len(), "Sending generateContent request");
        let response = self.post_with_retry(&url, &body, &model).await?;
        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| FluxoraError::llm(format!("Failed to parse Gemini response: {}", e)))?;

        parsed.text().ok_or_else(|| {
            FluxoraError::llm(format!("Gemini returned no candidates for model {}", model))
        })
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed_documents(&self, texts: &[String]) -> FluxoraResult<Vec<Vec<f32>>> {
        self.embed_batch(texts, EmbedTask::RetrievalDocument).await
    }

    async fn embed_query(&self, text: &str) -> FluxoraResult<Vec<f32>> {
        let mut embeddings = self
            .embed_batch(&[text.to_string()], EmbedTask::RetrievalQuery)
            .await?;
        embeddings
            .pop()
            .ok_or_else(|| FluxoraError::embedding("No embedding returned for query"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_chat(request: &ChatRequest, max_tokens: Option<u32>) -> Self {
        Self {
            system_instruction: request.system.as_ref().map(|text| WireContent {
                role: None,
                parts: vec![WirePart::Text { text: text.clone() }],
            }),
            contents: request.messages.iter().map(WireContent::from).collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: max_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl From<&Message> for WireContent {
    fn from(message: &Message) -> Self {
        Self {
            role: Some(message.role.as_str().to_string()),
            parts: message
                .parts
                .iter()
                .map(|part| match part {
                    Part::Text(text) => WirePart::Text { text: text.clone() },
                    Part::InlineImage { mime_type, data } => WirePart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.clone(),
                            data: data.clone(),
                        },
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<WireContent>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or None when it carries no text.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: Vec<&str> = content
            .parts
            .iter()
            .filter_map(|part| match part {
                WirePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text.concat())
        }
    }
}

/// Stored chunks and search queries are embedded for opposite sides of retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum EmbedTask {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

impl BatchEmbedRequest {
    fn new(model: &str, texts: &[String], task: EmbedTask) -> Self {
        Self {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model.to_string(),
                    content: WireContent {
                        role: None,
                        parts: vec![WirePart::Text { text: text.clone() }],
                    },
                    task_type: task,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: WireContent,
    task_type: EmbedTask,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> GeminiClient {
        let mut config = fluxora_utils::AppConfig::default().gemini;
        config.api_key = "test-key".to_string();
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let client = client();
        assert_eq!(
            client.endpoint("gemini-2.5-pro", "generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(
            client.endpoint("models/embedding-001", "batchEmbedContents"),
            "https://generativelanguage.googleapis.com/v1beta/models/embedding-001:batchEmbedContents"
        );
        assert_eq!(client.model_name(ModelTier::Best), "gemini-2.5-pro");
        assert_eq!(client.model_name(ModelTier::Vision), "gemini-2.5-flash");
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest::new(ModelTier::Vision, 0.3)
            .system("you are an image analyzing assistant")
            .message(Message::user_with_image("Analyze this image", "image/jpeg", "abc="));
        let body = serde_json::to_value(GenerateContentRequest::from_chat(&request, None)).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "you are an image analyzing assistant"
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Analyze this image");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "abc=");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "world"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Hello world"));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_embedding_task_types() {
        let texts = vec!["Ownership rules".to_string(), "Borrowing".to_string()];
        let documents = serde_json::to_value(BatchEmbedRequest::new(
            "models/embedding-001",
            &texts,
            EmbedTask::RetrievalDocument,
        ))
        .unwrap();
        assert_eq!(documents["requests"].as_array().unwrap().len(), 2);
        assert_eq!(documents["requests"][0]["model"], "models/embedding-001");
        assert_eq!(documents["requests"][1]["content"]["parts"][0]["text"], "Borrowing");
        assert_eq!(documents["requests"][0]["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(documents["requests"][1]["taskType"], "RETRIEVAL_DOCUMENT");

        let query = serde_json::to_value(BatchEmbedRequest::new(
            "models/embedding-001",
            &["what is ownership?".to_string()],
            EmbedTask::RetrievalQuery,
        ))
        .unwrap();
        assert_eq!(query["requests"][0]["taskType"], "RETRIEVAL_QUERY");
        assert!(query["requests"][0]["content"].get("role").is_none());
    }

    #[test]
    fn test_status_error_classification() {
        let quota = status_error(429, "slow down".to_string());
        assert_eq!(quota.error_code(), "RATE_LIMIT_EXCEEDED");
        assert!(quota.is_transient());

        let unavailable = status_error(503, "overloaded".to_string());
        assert_eq!(unavailable.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert!(unavailable.is_transient());

        let rejected = status_error(400, "bad request".to_string());
        assert_eq!(rejected.error_code(), "LLM_ERROR");
        assert!(!rejected.is_transient());
        assert!(rejected.to_string().contains("HTTP 400"));
    }

    #[test]
    fn test_client_spaces_requests_from_config() {
        let client = client();
        assert_eq!(client.limiter.interval(), Duration::from_secs(6));
    }

    #[test]
    fn test_embedding_response_parsing() {
        let parsed: BatchEmbedResponse = serde_json::from_value(json!({
            "embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]
        }))
        .unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1].values, vec![0.3, 0.4]);
    }
}
