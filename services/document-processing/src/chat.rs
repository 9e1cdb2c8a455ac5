//! Retrieval-grounded answers over the indexed documents.

use fluxora_documents::image_analysis::{prepare_image, ImageLimits};
use fluxora_llm::{prompts, ChatModel, ChatRequest, Message, ModelTier, PromptLibrary};
use fluxora_models::{ChatMessage, ContentType, RetrievedChunk, UNKNOWN_CATEGORY};
use fluxora_utils::{FluxoraResult, ImageConfig};
use std::sync::Arc;
use tracing::{debug, warn};

pub const NO_RESULTS_REPLY: &str =
    "Sorry Sir but I could not find any relevant information in the uploaded data to answer this query.";

const CHAT_TEMPERATURE: f32 = 0.7;

#[derive(Clone)]
pub struct ChatEngine {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptLibrary>,
    history_window: usize,
    limits: ImageLimits,
}

impl ChatEngine {
    pub fn new(
        model: Arc<dyn ChatModel>,
        prompts: Arc<PromptLibrary>,
        history_window: usize,
        image: &ImageConfig,
    ) -> Self {
        Self {
            model,
            prompts,
            history_window,
            limits: ImageLimits::from_config(image),
        }
    }

    /// Answer `query` from the retrieved chunks. Model failures come back as
    /// an apology carrying the error, never as an `Err`.
    pub async fn get_response(
        &self,
        query: &str,
        results: &[RetrievedChunk],
        history: &[ChatMessage],
    ) -> String {
        if results.is_empty() {
            return NO_RESULTS_REPLY.to_string();
        }

        match self.answer(query, results, history).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Chat completion failed");
                format!(
                    "Sorry Sir, but there is an error while processing the questions through the llm: {}",
                    e
                )
            }
        }
    }

    async fn answer(
        &self,
        query: &str,
        results: &[RetrievedChunk],
        history: &[ChatMessage],
    ) -> FluxoraResult<String> {
        let context = build_context(results);
        let history = format_history(history, self.history_window);
        debug!(chunks = results.len(), context_chars = context.len(), "Built chat context");

        let request = ChatRequest::new(ModelTier::Best, CHAT_TEMPERATURE)
            .system(prompts::CHAT_SYSTEM)
            .user(self.prompts.chat(&context, query, &history)?);

        self.model.complete(request).await
    }

    /// Ask a question about one image.
    pub async fn analyze_image_with_query(&self, image_base64: &str, query: &str) -> String {
        match self.ask_image(image_base64, query).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Image query failed");
                format!(
                    "Sorry sir but there was an Error analyzing image for this query: {}",
                    e
                )
            }
        }
    }

    async fn ask_image(&self, image_base64: &str, query: &str) -> FluxoraResult<String> {
        let jpeg = prepare_image(image_base64, &self.limits)?;
        let request = ChatRequest::new(ModelTier::Best, CHAT_TEMPERATURE)
            .system(self.prompts.image_query(query)?)
            .message(Message::user_with_image(prompts::IMAGE_QUERY_USER, "image/jpeg", jpeg));

        self.model.complete(request).await
    }
}

/// One labelled block per retrieved chunk, numbered from 1.
pub fn build_context(results: &[RetrievedChunk]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let source = if chunk.metadata.source.is_empty() {
                UNKNOWN_CATEGORY
            } else {
                chunk.metadata.source.as_str()
            };
            let mut part = format!("Document {} (source: {}):\n", i + 1, source);

            match chunk.metadata.content_type {
                ContentType::Image => {
                    part.push_str(&format!("Image Description: {}\n", chunk.content));
                }
                ContentType::Table => {
                    part.push_str(&format!("Table content: {}\n", chunk.content));
                    if !chunk.metadata.html_content.is_empty() {
                        part.push_str(&format!("Table HTML: {}\n", chunk.metadata.html_content));
                    }
                }
                ContentType::Text => {
                    part.push_str(&format!("Content: {}\n", chunk.content));
                }
            }
            part
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Last `window` messages as `role: content` lines.
pub fn format_history(messages: &[ChatMessage], window: usize) -> String {
    let start = messages.len().saturating_sub(window);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
