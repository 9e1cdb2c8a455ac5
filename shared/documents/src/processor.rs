use fluxora_models::{ContentType, Element, ProcessedDocument, ProcessingStatus, UNKNOWN_CATEGORY};
use fluxora_llm::ChatModel;
use fluxora_utils::{metrics, validate_pdf_upload, AppConfig, FluxoraError, FluxoraResult};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{ImageAnalyzer, Partitioner, RawElement};

/// Hex chars of the content hash used to namespace element ids
const ID_PREFIX_LEN: usize = 12;

#[derive(Clone)]
pub struct PdfProcessor {
    partitioner: Arc<dyn Partitioner>,
    images: ImageAnalyzer,
}

impl PdfProcessor {
    pub fn new(partitioner: Arc<dyn Partitioner>, images: ImageAnalyzer) -> Self {
        Self { partitioner, images }
    }

    /// Partitioner chosen by `partitioning.backend`, images described by `vision`.
    pub fn from_config(config: &AppConfig, vision: Arc<dyn ChatModel>) -> FluxoraResult<Self> {
        Ok(Self::new(
            crate::build_partitioner(&config.partitioning)?,
            ImageAnalyzer::new(vision, &config.image),
        ))
    }

    /// Validate, partition and type the elements of one uploaded PDF.
    pub async fn process_document(&self, filename: &str, data: &[u8]) -> FluxoraResult<ProcessedDocument> {
        validate_pdf_upload(filename, data)?;

        let mut document = ProcessedDocument::new(filename, content_hash(data), data.len());
        document.transition(ProcessingStatus::Processing);

        match self.process(filename, &document.sha256, data).await {
            Ok(elements) => {
                document.elements = elements;
                document.transition(ProcessingStatus::Processed);
                metrics::DOCUMENTS_PROCESSED
                    .with_label_values(&[metrics::outcome(true)])
                    .inc();
                info!(
                    document_id = %document.id,
                    filename,
                    elements = document.elements.len(),
                    partitioner = self.partitioner.name(),
                    "Processed PDF"
                );
                Ok(document)
            }
            Err(e) => {
                metrics::DOCUMENTS_PROCESSED
                    .with_label_values(&[metrics::outcome(false)])
                    .inc();
                Err(e)
            }
        }
    }

    async fn process(&self, source: &str, sha256: &str, data: &[u8]) -> FluxoraResult<Vec<Element>> {
        let raw = self
            .partitioner
            .partition(source, data)
            .await
            .map_err(|e| {
                FluxoraError::document_processing(format!("Could not read {}: {}", source, e))
            })?;

        let prefix = &sha256[..ID_PREFIX_LEN.min(sha256.len())];
        let mut elements = Vec::with_capacity(raw.len());
        for (i, raw_element) in raw.into_iter().enumerate() {
            let id = format!("{}-element_{}", prefix, i);
            elements.push(self.build_element(id, source, raw_element).await);
        }
        Ok(elements)
    }

    async fn build_element(&self, id: String, source: &str, raw: RawElement) -> Element {
        let category = raw
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        let mut element = Element::new(id, category, raw.text, source);
        element.page_number = raw.page_number;
        element.metadata = raw.metadata;

        match element.content_type {
            ContentType::Table => {
                element.html_content = raw.text_as_html.filter(|html| !html.is_empty());
            }
            ContentType::Image => {
                if let Some(image_base64) = raw.image_base64.filter(|b| !b.is_empty()) {
                    let description = self.images.describe(&image_base64).await;
                    if description == crate::IMAGE_FALLBACK_DESCRIPTION {
                        warn!(element = %element.id, "Stored image without a usable description");
                    }
                    element.content = format!("Image: {}", description);
                    element.image_desc = Some(description);
                    element.image_data = Some(image_base64);
                }
            }
            ContentType::Text => {}
        }

        element
    }
}

pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_analysis::tests::png_base64;
    use async_trait::async_trait;
    use fluxora_llm::testing::ScriptedChatModel;
    use fluxora_utils::AppConfig;

    struct FixedPartitioner(Vec<RawElement>);

    #[async_trait]
    impl Partitioner for FixedPartitioner {
        async fn partition(&self, _filename: &str, _data: &[u8]) -> FluxoraResult<Vec<RawElement>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct BrokenPartitioner;

    #[async_trait]
    impl Partitioner for BrokenPartitioner {
        async fn partition(&self, _filename: &str, _data: &[u8]) -> FluxoraResult<Vec<RawElement>> {
            Err(FluxoraError::external_service("Unstructured", "HTTP 500"))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn processor(partitioner: Arc<dyn Partitioner>) -> PdfProcessor {
        let images = ImageAnalyzer::new(
            Arc::new(ScriptedChatModel::always("A pie chart of market share")),
            &AppConfig::default().image,
        );
        PdfProcessor::new(partitioner, images)
    }

    const PDF: &[u8] = b"%PDF-1.7\nfake body";

    #[tokio::test]
    async fn test_elements_are_typed() {
        let mut table = RawElement::text("Table", "Name Value A 1");
        table.text_as_html = Some("<table><tr><td>A</td></tr></table>".to_string());
        let mut image = RawElement::text("Image", "");
        image.image_base64 = Some(png_base64(4, 4));
        let mut untyped = RawElement::text("", "loose text");
        untyped.category = None;

        let processor = processor(Arc::new(FixedPartitioner(vec![
            RawElement::text("Title", "Annual Report"),
            table,
            image,
            untyped,
        ])));
        let document = processor.process_document("report.pdf", PDF).await.unwrap();

        assert_eq!(document.status, ProcessingStatus::Processed);
        assert_eq!(document.elements.len(), 4);

        let prefix = &document.sha256[..12];
        assert_eq!(document.elements[0].id, format!("{}-element_0", prefix));
        assert_eq!(document.elements[0].content_type, ContentType::Text);
        assert_eq!(document.elements[0].source, "report.pdf");

        assert_eq!(document.elements[1].content_type, ContentType::Table);
        assert!(document.elements[1].html_content.is_some());

        let image = &document.elements[2];
        assert_eq!(image.content_type, ContentType::Image);
        assert_eq!(image.image_desc.as_deref(), Some("A pie chart of market share"));
        assert_eq!(image.content, "Image: A pie chart of market share");
        assert!(image.image_data.is_some());

        assert_eq!(document.elements[3].category, "unknown");
        assert_eq!(document.elements[3].content_type, ContentType::Text);
    }

    #[tokio::test]
    async fn test_image_without_payload_is_not_described() {
        let processor = processor(Arc::new(FixedPartitioner(vec![RawElement::text("Image", "caption")])));
        let document = processor.process_document("a.pdf", PDF).await.unwrap();

        let image = &document.elements[0];
        assert_eq!(image.content_type, ContentType::Image);
        assert_eq!(image.content, "caption");
        assert!(image.image_desc.is_none());
    }

    #[tokio::test]
    async fn test_empty_table_html_dropped() {
        let mut table = RawElement::text("Table", "x");
        table.text_as_html = Some(String::new());
        let processor = processor(Arc::new(FixedPartitioner(vec![table])));
        let document = processor.process_document("a.pdf", PDF).await.unwrap();
        assert!(document.elements[0].html_content.is_none());
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_upload() {
        let processor = processor(Arc::new(FixedPartitioner(Vec::new())));
        let err = processor.process_document("notes.txt", b"plain text").await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = processor.process_document("empty.pdf", b"").await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_partition_failure_names_file() {
        let processor = processor(Arc::new(BrokenPartitioner));
        let err = processor.process_document("scan.pdf", PDF).await.unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_PROCESSING_ERROR");
        assert!(err.to_string().contains("scan.pdf"));
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
