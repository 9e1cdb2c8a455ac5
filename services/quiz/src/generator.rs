//! Topic extraction and question generation from processed PDF elements.

use fluxora_llm::{ChatModel, ChatRequest, ModelTier, PromptLibrary};
use fluxora_models::{
    ContentType, Element, QuestionType, Quiz, QuizQuestion, DEFAULT_EXPLANATION,
    DEFAULT_REVIEW_SECTION, QUIZ_QUESTION_PLAN,
};
use fluxora_utils::{take_chars, truncate_chars, FluxoraResult};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const FALLBACK_TOPICS: [&str; 3] = ["General Content", "Key Concepts", "Main Ideas"];
pub const GENERAL_CONTENT: &str = "General content from the document";

const MAX_TOPICS: usize = 7;
const TOPIC_SOURCE_CHARS: usize = 8000;
const RELEVANT_CONTENT_CHARS: usize = 6000;
const QUESTION_CONTENT_CHARS: usize = 3000;
const GENERAL_ELEMENT_COUNT: usize = 5;
const QUIZ_TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct QuizGenerator {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptLibrary>,
}

impl QuizGenerator {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    /// Up to seven quiz topics. Falls back to a fixed list when the model fails.
    pub async fn extract_topics(&self, elements: &[Element]) -> Vec<String> {
        match self.request_topics(elements).await {
            Ok(topics) => topics,
            Err(e) => {
                warn!(error = %e, "Error extracting topics");
                FALLBACK_TOPICS.iter().map(|t| t.to_string()).collect()
            }
        }
    }

    async fn request_topics(&self, elements: &[Element]) -> FluxoraResult<Vec<String>> {
        let source = truncate_chars(&topic_source_text(elements), TOPIC_SOURCE_CHARS);
        let request = ChatRequest::new(ModelTier::Best, QUIZ_TEMPERATURE)
            .user(self.prompts.topics(&source)?);

        let response = self.model.complete(request).await?;
        Ok(parse_topics(&response))
    }

    /// Five questions on `topic` following the fixed type plan. Questions the
    /// model cannot produce are skipped; if none survive, one generic
    /// multiple choice question stands in.
    pub async fn generate_quiz(&self, document_id: Uuid, topic: &str, elements: &[Element]) -> Quiz {
        let content = topic_relevant_content(topic, elements);
        let content = take_chars(&content, QUESTION_CONTENT_CHARS);

        let mut questions = Vec::with_capacity(QUIZ_QUESTION_PLAN.len());
        for question_type in QUIZ_QUESTION_PLAN {
            match self.generate_question(topic, content, question_type).await {
                Ok(Some(question)) => questions.push(question),
                Ok(None) => warn!(%question_type, "Model response had no question"),
                Err(e) => warn!(%question_type, error = %e, "Error generating question"),
            }
        }

        if questions.is_empty() {
            questions.push(fallback_question(topic));
        }

        info!(topic, count = questions.len(), "Generated quiz");
        Quiz::new(document_id, topic, questions)
    }

    async fn generate_question(
        &self,
        topic: &str,
        content: &str,
        question_type: QuestionType,
    ) -> FluxoraResult<Option<QuizQuestion>> {
        let prompt = self.prompts.question(question_type.as_str(), topic, content)?;
        let request = ChatRequest::new(ModelTier::Best, QUIZ_TEMPERATURE).user(prompt);
        let response = self.model.complete(request).await?;
        Ok(parse_question(response.trim(), question_type))
    }
}

/// Text, tables and image descriptions, one per line.
pub fn topic_source_text(elements: &[Element]) -> String {
    let mut text = String::new();
    for element in elements {
        match element.content_type {
            ContentType::Text => {
                text.push_str(&element.content);
                text.push('\n');
            }
            ContentType::Table => {
                text.push_str(&format!("Table content: {}\n", element.content));
            }
            ContentType::Image => {
                if let Some(description) = element.described_image() {
                    text.push_str(&format!("Image description: {}\n", description));
                }
            }
        }
    }
    text
}

/// Numbered or dashed lines of the model's reply, numbering stripped.
pub fn parse_topics(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.chars()
                .next()
                .map_or(false, |c| c.is_ascii_digit() || c == '-')
        })
        .map(|line| {
            let after_number = line.split_once('.').map_or(line, |(_, rest)| rest);
            let after_dash = after_number.split_once('-').map_or(after_number, |(_, rest)| rest);
            after_dash.trim().to_string()
        })
        .filter(|topic| topic.chars().count() > 2)
        .take(MAX_TOPICS)
        .collect()
}

/// Elements mentioning any word of `topic`; the first few elements when none do.
pub fn topic_relevant_content(topic: &str, elements: &[Element]) -> String {
    let words: Vec<String> = topic.to_lowercase().split_whitespace().map(str::to_string).collect();

    let mut content = String::new();
    for element in elements {
        let lowered = element.content.to_lowercase();
        if !words.iter().any(|word| lowered.contains(word.as_str())) {
            continue;
        }
        match element.content_type {
            ContentType::Text => {
                content.push_str(&element.content);
                content.push('\n');
            }
            ContentType::Table => content.push_str(&format!("Table: {}\n", element.content)),
            ContentType::Image => {
                if let Some(description) = element.described_image() {
                    content.push_str(&format!("Image: {}\n", description));
                }
            }
        }
    }

    if content.trim().is_empty() {
        for element in elements.iter().take(GENERAL_ELEMENT_COUNT) {
            match element.content_type {
                ContentType::Text => {
                    content.push_str(&element.content);
                    content.push('\n');
                }
                ContentType::Table => content.push_str(&format!("Table: {}\n", element.content)),
                ContentType::Image => {}
            }
        }
    }

    let content = truncate_chars(&content, RELEVANT_CONTENT_CHARS);
    if content.is_empty() {
        GENERAL_CONTENT.to_string()
    } else {
        content
    }
}

/// Read the `QUESTION:` / `A)`..`D)` / `CORRECT:` / `EXPLANATION:` / `REVIEW:`
/// line protocol. `None` when no question text was given.
pub fn parse_question(response: &str, question_type: QuestionType) -> Option<QuizQuestion> {
    let mut question = String::new();
    let mut options = Vec::new();
    let mut correct_answer = String::new();
    let mut explanation = String::new();
    let mut review_section = String::new();

    for line in response.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("QUESTION:") {
            question = rest.trim().to_string();
        } else if ["A)", "B)", "C)", "D)"].iter().any(|p| line.starts_with(p)) {
            options.push(line.to_string());
        } else if let Some(rest) = line.strip_prefix("CORRECT:") {
            correct_answer = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("EXPLANATION:") {
            explanation = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("REVIEW:") {
            review_section = rest.trim().to_string();
        }
    }

    if question.is_empty() {
        return None;
    }

    Some(QuizQuestion {
        question_type,
        question,
        options: if question_type == QuestionType::MultipleChoice {
            options
        } else {
            Vec::new()
        },
        correct_answer,
        explanation: non_empty_or(explanation, DEFAULT_EXPLANATION),
        review_section: non_empty_or(review_section, DEFAULT_REVIEW_SECTION),
    })
}

pub fn fallback_question(topic: &str) -> QuizQuestion {
    QuizQuestion {
        question_type: QuestionType::MultipleChoice,
        question: format!(
            "Based on the document content about {}, which statement is most accurate?",
            topic
        ),
        options: vec![
            "A) The document provides comprehensive information on this topic".to_string(),
            "B) The topic is not covered in the document".to_string(),
            "C) The information is incomplete".to_string(),
            "D) No relevant details are provided".to_string(),
        ],
        correct_answer: "A".to_string(),
        explanation: "The document contains relevant information about the topic.".to_string(),
        review_section: format!("Review the main content about {}", topic),
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
