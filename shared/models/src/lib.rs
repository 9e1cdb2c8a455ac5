//! # Fluxora Core Domain Models
//!
//! This module contains the domain models shared by every Fluxora service.
//! All models implement serialization/deserialization with serde so they can
//! travel over the HTTP APIs unchanged.
//!
//! ## Key Models
//!
//! - **Element**: a unit of extracted PDF content (text block, table or image)
//! - **ProcessedDocument**: an uploaded PDF together with its elements
//! - **ChatSession**: the conversation state of the PDF analysis chat
//! - **Quiz**: generated quiz questions and graded results
//! - **EnhancedSummary**: structured video/text summaries
//! - **DocumentType**: localization strategy classification

pub mod element;
pub mod document;
pub mod chat;
pub mod quiz;
pub mod summary;
pub mod localization;
pub mod flowchart;
pub mod credits;


pub use element::*;
pub use document::*;
pub use chat::*;
pub use quiz::*;
pub use summary::*;
pub use localization::*;
pub use flowchart::*;
pub use credits::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_page_content_uses_description() {
        let mut element = Element::new("doc-element_0", "Image", "ignored", "paper.pdf");
        element.image_desc = Some("A bar chart of revenue".to_string());

        assert_eq!(element.content_type, ContentType::Image);
        assert_eq!(element.page_content(), "Image: A bar chart of revenue");
    }

    #[test]
    fn test_image_page_content_without_description() {
        let element = Element::new("doc-element_1", "Image", "", "paper.pdf");
        assert_eq!(element.page_content(), "Image: No image description");
    }

    #[test]
    fn test_table_page_content_appends_html() {
        let mut element = Element::new("doc-element_2", "Table", "a b c", "paper.pdf");
        element.html_content = Some("<table><tr><td>a</td></tr></table>".to_string());

        assert_eq!(
            element.page_content(),
            "a b c\nTable HTML: <table><tr><td>a</td></tr></table>"
        );
    }

    #[test]
    fn test_text_page_content() {
        let element = Element::new("doc-element_3", "NarrativeText", "hello", "paper.pdf");
        assert_eq!(element.content_type, ContentType::Text);
        assert_eq!(element.page_content(), "hello");
    }

    #[test]
    fn test_processing_status_transitions() {
        assert!(ProcessingStatus::Uploaded.can_transition_to(ProcessingStatus::Processing));
        assert!(ProcessingStatus::Processing.can_transition_to(ProcessingStatus::Processed));
        assert!(ProcessingStatus::Processing.can_transition_to(ProcessingStatus::Failed));
        assert!(ProcessingStatus::Failed.can_transition_to(ProcessingStatus::Processing));
        assert!(!ProcessingStatus::Processed.can_transition_to(ProcessingStatus::Processing));
        assert!(!ProcessingStatus::Uploaded.can_transition_to(ProcessingStatus::Processed));
    }

    #[test]
    fn test_chat_session_history_window() {
        let mut session = ChatSession::new();
        for i in 0..8 {
            session.push(ChatMessage::user(format!("question {}", i)));
        }

        let recent = session.recent_history(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].content, "question 3");
        assert_eq!(recent[4].content, "question 7");
    }

    #[test]
    fn test_summary_stats() {
        let stats = SummaryStats::compute(
            "one two three four five six seven eight nine ten. Second sentence.",
            "one two",
        );
        assert_eq!(stats.transcript_words, 12);
        assert_eq!(stats.summary_words, 2);
        assert_eq!(stats.compression_percent, Some(83.3));
        assert_eq!(stats.sentences, 2);
    }

    #[test]
    fn test_document_type_titles() {
        assert_eq!(DocumentType::Business.title(), "Business");
        assert_eq!(DocumentType::General.as_str(), "general");
    }

    #[test]
    fn test_language_catalogue_lookup() {
        assert_eq!(LANGUAGES.len(), 54);
        assert_eq!(CULTURAL_CONTEXTS.len(), 22);
        assert_eq!(language_label("Hindi"), Some("Hindi (हिंदी) - India"));
        assert!(language_label("Klingon").is_none());
        assert!(cultural_context_description("India - General").is_some());
    }

    #[test]
    fn test_credits_default() {
        let credits = Credits::default();
        assert_eq!(credits.names.len(), 4);
        assert_eq!(credits.team, "Code&Chil");
    }
}
