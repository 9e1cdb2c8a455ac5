use async_trait::async_trait;
use fluxora_utils::{FluxoraError, FluxoraResult};
use serde_json::Value;
use tracing::info;

use crate::{Partitioner, RawElement};

const PAGE_BREAK: char = '\u{000C}';
const COMPOSITE_ELEMENT: &str = "CompositeElement";

/// Text-only partitioning with `pdf-extract`, for when the Unstructured API
/// is not available. Tables and images come through as plain text or not at all.
pub struct LocalPartitioner {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl LocalPartitioner {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split extracted text into page-tagged chunks.
    pub fn elements_from_text(&self, text: &str) -> Vec<RawElement> {
        let mut elements = Vec::new();
        for (page_index, page) in text.split(PAGE_BREAK).enumerate() {
            for chunk in chunk_text(page, self.chunk_size, self.chunk_overlap) {
                let mut element = RawElement::text(COMPOSITE_ELEMENT, chunk);
                let page_number = page_index as u32 + 1;
                element.page_number = Some(page_number);
                element
                    .metadata
                    .insert("page_number".to_string(), Value::from(page_number));
                elements.push(element);
            }
        }
        elements
    }
}

/// Windows of `size` chars, each starting `size - overlap` chars after the last.
/// Blank windows are dropped and the rest trimmed.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }

    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[async_trait]
impl Partitioner for LocalPartitioner {
    async fn partition(&self, filename: &str, data: &[u8]) -> FluxoraResult<Vec<RawElement>> {
        let bytes = data.to_vec();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                FluxoraError::document_processing(format!("PDF text extraction aborted: {}", e))
            })?
            .map_err(|e| {
                FluxoraError::document_processing(format!("Failed to extract text from PDF: {}", e))
            })?;

        let elements = self.elements_from_text(&text);
        info!(filename, count = elements.len(), "Partitioned PDF locally");
        Ok(elements)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
