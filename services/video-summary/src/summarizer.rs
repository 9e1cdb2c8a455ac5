use fluxora_llm::{ChatModel, ChatRequest, ModelTier, PromptLibrary};
use fluxora_models::{AnalysisType, EnhancedSummary};
use fluxora_utils::FluxoraResult;
use std::sync::Arc;
use tracing::info;

const SUMMARY_TEMPERATURE: f32 = 0.3;

pub const EMPTY_FILE_SUMMARY: &str = "File is empty or unreadable.";
pub const EMPTY_TEXT_SUMMARY: &str = "Text is empty or unreadable.";

#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptLibrary>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    /// Bullet-point summary faithful to the source.
    pub async fn summarize_text(&self, text: &str) -> FluxoraResult<String> {
        if text.trim().is_empty() {
            return Ok(EMPTY_FILE_SUMMARY.to_string());
        }

        let request = ChatRequest::new(ModelTier::Best, SUMMARY_TEMPERATURE)
            .user(self.prompts.standard_summary(text)?);
        let summary = self.model.complete(request).await?;
        info!(words = summary.split_whitespace().count(), "Generated standard summary");
        Ok(summary)
    }

    /// Summary, top three key points and insights.
    pub async fn enhanced_summary(&self, text: &str) -> FluxoraResult<EnhancedSummary> {
        if text.trim().is_empty() {
            return Ok(EnhancedSummary {
                summary: EMPTY_TEXT_SUMMARY.to_string(),
                ..EnhancedSummary::default()
            });
        }

        let request = ChatRequest::new(ModelTier::Best, SUMMARY_TEMPERATURE)
            .user(self.prompts.enhanced_summary(text)?);
        let response = self.model.complete(request).await?;
        let analysis = parse_enhanced_summary(&response);
        info!(key_points = analysis.key_points.len(), "Generated enhanced summary");
        Ok(analysis)
    }

    /// Either analysis, standard results carrying no key points or insights.
    pub async fn analyze(&self, text: &str, analysis_type: AnalysisType) -> FluxoraResult<EnhancedSummary> {
        match analysis_type {
            AnalysisType::Enhanced => self.enhanced_summary(text).await,
            AnalysisType::Standard => Ok(EnhancedSummary {
                summary: self.summarize_text(text).await?,
                ..EnhancedSummary::default()
            }),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Summary,
    KeyPoints,
    Insights,
}

/// Split a `SUMMARY:` / `KEY POINTS:` / `INSIGHTS:` response.
///
/// Only numbered lines `1.` to `3.` count as key points. When no summary
/// section is found the whole response becomes the summary.
pub fn parse_enhanced_summary(response: &str) -> EnhancedSummary {
    let mut parsed = EnhancedSummary::default();
    let mut section = None;

    for line in response.lines().map(str::trim) {
        if line.starts_with("SUMMARY:") {
            section = Some(Section::Summary);
            continue;
        }
        if line.starts_with("KEY POINTS:") {
            section = Some(Section::KeyPoints);
            continue;
        }
        if line.starts_with("INSIGHTS:") {
            section = Some(Section::Insights);
            continue;
        }
        if line.is_empty() {
            continue;
        }

        match section {
            Some(Section::Summary) => {
                parsed.summary.push_str(line);
                parsed.summary.push('\n');
            }
            Some(Section::KeyPoints) if ["1.", "2.", "3."].iter().any(|p| line.starts_with(p)) => {
                parsed.key_points.push(line.to_string());
            }
            Some(Section::Insights) => {
                parsed.insights.push_str(line);
                parsed.insights.push(' ');
            }
            _ => {}
        }
    }

    if parsed.summary.is_empty() {
        parsed.summary = response.to_string();
    }
    parsed
}
