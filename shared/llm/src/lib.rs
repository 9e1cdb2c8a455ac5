//! # Fluxora LLM access
//!
//! Chat, vision and embedding calls go through the [`ChatModel`] and
//! [`Embedder`] traits so services can run against Gemini in production and
//! scripted doubles in tests.

use async_trait::async_trait;
use fluxora_utils::FluxoraResult;

pub mod gemini;
pub mod prompts;
pub mod rate_limit;
pub mod retry;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use gemini::GeminiClient;
pub use prompts::PromptLibrary;
pub use rate_limit::RateLimiter;
pub use types::{ChatRequest, Message, ModelTier, Part, Role};

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Text of the model's reply.
    async fn complete(&self, request: ChatRequest) -> FluxoraResult<String>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> FluxoraResult<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> FluxoraResult<Vec<f32>>;
}
