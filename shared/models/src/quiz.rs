use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Score (percent) needed to pass a quiz
pub const PASS_THRESHOLD: f64 = 60.0;

pub const DEFAULT_EXPLANATION: &str = "Answer explanation not available";
pub const DEFAULT_REVIEW_SECTION: &str = "Review the relevant content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    ShortAnswer,
}

/// Question mix of every generated quiz, in order
pub const QUIZ_QUESTION_PLAN: [QuestionType; 5] = [
    QuestionType::MultipleChoice,
    QuestionType::MultipleChoice,
    QuestionType::TrueFalse,
    QuestionType::FillBlank,
    QuestionType::ShortAnswer,
];

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::FillBlank => "fill_blank",
            Self::ShortAnswer => "short_answer",
        }
    }

    /// Answers compared exactly rather than by word overlap
    pub fn is_exact_match(&self) -> bool {
        matches!(self, Self::MultipleChoice | Self::TrueFalse)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub review_section: String,
}

/// A question as shown to the quiz taker (no answer, no explanation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestionView {
    pub index: usize,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub document_id: Uuid,
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(document_id: Uuid, topic: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            topic: topic.into(),
            questions,
            created_at: Utc::now(),
        }
    }

    pub fn view(&self) -> Vec<QuizQuestionView> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuizQuestionView {
                index,
                question_type: q.question_type,
                question: q.question.clone(),
                options: q.options.clone(),
            })
            .collect()
    }
}

/// Answers keyed by question index
pub type QuizAnswers = HashMap<usize, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub index: usize,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub explanation: String,
    pub review_section: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: Uuid,
    pub topic: String,
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub passed: bool,
    pub outcomes: Vec<QuestionOutcome>,
    pub recommendations: Vec<String>,
}
