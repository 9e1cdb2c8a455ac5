//! Document type detection and culturally localized summaries.

use fluxora_llm::{ChatModel, ChatRequest, ModelTier, PromptLibrary};
use fluxora_models::{ContentType, DocumentType, Element};
use fluxora_utils::FluxoraResult;
use std::sync::Arc;
use tracing::{info, warn};

/// A type needs more keyword hits than this to beat `General`
const MIN_KEYWORD_HITS: usize = 2;
const LOCALIZATION_TEMPERATURE: f32 = 0.3;

const BUSINESS_KEYWORDS: &[&str] = &[
    "business", "market", "revenue", "profit", "sales", "customer", "strategy", "management",
    "company", "corporate", "finance", "investment", "contract", "agreement", "proposal",
];
const LEGAL_KEYWORDS: &[&str] = &[
    "legal", "law", "regulation", "compliance", "contract", "agreement", "terms", "conditions",
    "liability", "jurisdiction", "court", "statute", "clause",
];
const TECHNICAL_KEYWORDS: &[&str] = &[
    "technical", "specification", "algorithm", "system", "software", "hardware", "engineering",
    "protocol", "implementation", "architecture",
];
const SCIENTIFIC_KEYWORDS: &[&str] = &[
    "research", "study", "analysis", "method", "experiment", "data", "results", "conclusion",
    "hypothesis", "theory", "scientific", "academic",
];
const MEDICAL_KEYWORDS: &[&str] = &[
    "medical", "health", "patient", "treatment", "diagnosis", "clinical", "therapeutic",
    "pharmaceutical", "healthcare", "medicine",
];
const EDUCATIONAL_KEYWORDS: &[&str] = &[
    "education", "learning", "student", "teacher", "curriculum", "academic", "school",
    "university", "course", "training",
];

fn keywords(doc_type: DocumentType) -> &'static [&'static str] {
    match doc_type {
        DocumentType::Business => BUSINESS_KEYWORDS,
        DocumentType::Legal => LEGAL_KEYWORDS,
        DocumentType::Technical => TECHNICAL_KEYWORDS,
        DocumentType::Scientific => SCIENTIFIC_KEYWORDS,
        DocumentType::Medical => MEDICAL_KEYWORDS,
        DocumentType::Educational => EDUCATIONAL_KEYWORDS,
        DocumentType::General => &[],
    }
}

/// Type whose keyword list has the most distinct hits; earlier types win ties.
pub fn detect_document_type(elements: &[Element]) -> DocumentType {
    let text = elements
        .iter()
        .map(|element| match element.content_type {
            ContentType::Text | ContentType::Table => element.content.as_str(),
            ContentType::Image => element.image_desc.as_deref().unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut best = (DocumentType::General, 0);
    for doc_type in DocumentType::CANDIDATES {
        let hits = keywords(doc_type).iter().filter(|k| text.contains(*k)).count();
        if hits > best.1 {
            best = (doc_type, hits);
        }
    }

    if best.1 > MIN_KEYWORD_HITS {
        best.0
    } else {
        DocumentType::General
    }
}

pub fn localization_strategy(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::Business => "Focus on:
- Local business practices and etiquette
- Market-specific terminology and concepts
- Regional business culture nuances
- Local regulatory and compliance considerations
- Currency, units, and measurement adaptations
- Cultural business relationship dynamics",
        DocumentType::Legal => "Focus on:
- Legal system differences and terminology
- Regional regulatory frameworks
- Cultural interpretations of legal concepts
- Local compliance requirements
- Jurisdiction-specific considerations
- Note: Mention when local legal consultation is recommended",
        DocumentType::Technical => "Focus on:
- Technical terminology in target language
- Regional technical standards and practices
- Local technology adoption patterns
- Cultural approach to technical implementation
- Keep core technical concepts accurate",
        DocumentType::Scientific => "Focus on:
- Scientific terminology in target language
- Regional research practices and standards
- Cultural context for scientific concepts
- Local academic and research frameworks
- Maintain scientific accuracy above cultural adaptation",
        DocumentType::Medical => "Focus on:
- Medical terminology in target language
- Regional healthcare systems and practices
- Cultural health beliefs and approaches
- Local medical regulations and standards
- Emphasize consulting local medical professionals",
        DocumentType::Educational => "Focus on:
- Educational terminology and concepts
- Regional educational systems and practices
- Cultural learning approaches and preferences
- Local academic standards and frameworks
- Age-appropriate cultural considerations",
        DocumentType::General => "Focus on:
- General cultural adaptation
- Language-appropriate explanations
- Regional context and relevance
- Cultural sensitivity and appropriateness",
    }
}

/// Every element as a labelled section.
pub fn document_content(elements: &[Element]) -> String {
    let mut content = String::new();
    for element in elements {
        match element.content_type {
            ContentType::Text => {
                content.push_str(&format!("\n\nText Section:\n{}", element.content));
            }
            ContentType::Table => {
                content.push_str(&format!("\n\nTable:\n{}", element.content));
                if let Some(html) = element.html_content.as_deref().filter(|h| !h.is_empty()) {
                    content.push_str(&format!("\n(HTML: {})", html));
                }
            }
            ContentType::Image => {
                content.push_str(&format!(
                    "\n\nImage Description:\n{}",
                    element.image_desc.as_deref().unwrap_or_default()
                ));
            }
        }
    }
    content
}

#[derive(Clone)]
pub struct Localizer {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptLibrary>,
}

impl Localizer {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    /// Summary in `language` for `context`. Model errors are returned as the
    /// summary text rather than failing the request.
    pub async fn generate_localized_summary(
        &self,
        elements: &[Element],
        language: &str,
        context: &str,
    ) -> String {
        match self.summarize(elements, language, context).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(language, context, error = %e, "Localization failed");
                format!("Error generating localized summary: {}", e)
            }
        }
    }

    async fn summarize(&self, elements: &[Element], language: &str, context: &str) -> FluxoraResult<String> {
        let doc_type = detect_document_type(elements);
        let prompt = self.prompts.localization(
            language,
            context,
            doc_type.title(),
            localization_strategy(doc_type),
            &document_content(elements),
        )?;
        let request = ChatRequest::new(ModelTier::Vision, LOCALIZATION_TEMPERATURE)
            .system(self.prompts.localization_system(language, context)?)
            .user(prompt);

        let summary = self.model.complete(request).await?;
        info!(language, context, %doc_type, chars = summary.len(), "Generated localized summary");
        Ok(summary)
    }
}
