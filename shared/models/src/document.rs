use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ContentType, Element};

/// Processing states of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Uploaded,
    Processing,
    Processed,
    Failed,
}

impl ProcessingStatus {
    /// Check if transition is valid
    pub fn can_transition_to(&self, target: ProcessingStatus) -> bool {
        use ProcessingStatus::*;

        matches!(
            (self, target),
            (Uploaded, Processing) | (Processing, Processed) | (Processing, Failed) | (Failed, Processing)
        )
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uploaded => write!(f, "uploaded"),
            Self::Processing => write!(f, "processing"),
            Self::Processed => write!(f, "processed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// An uploaded PDF and the elements extracted from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub id: Uuid,
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
    pub status: ProcessingStatus,
    pub error: Option<String>,
    pub elements: Vec<Element>,
}

impl ProcessedDocument {
    pub fn new(filename: impl Into<String>, sha256: impl Into<String>, size_bytes: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            sha256: sha256.into(),
            size_bytes,
            uploaded_at: Utc::now(),
            status: ProcessingStatus::Uploaded,
            error: None,
            elements: Vec::new(),
        }
    }

    /// Move to `target` if the transition is allowed. Returns whether it happened.
    pub fn transition(&mut self, target: ProcessingStatus) -> bool {
        if self.status.can_transition_to(target) {
            self.status = target;
            true
        } else {
            false
        }
    }

    pub fn summary(&self) -> DocumentSummary {
        let count = |ct: ContentType| self.elements.iter().filter(|e| e.content_type == ct).count();

        DocumentSummary {
            document_id: self.id,
            filename: self.filename.clone(),
            status: self.status,
            uploaded_at: self.uploaded_at,
            total_elements: self.elements.len(),
            text_elements: count(ContentType::Text),
            table_elements: count(ContentType::Table),
            image_elements: count(ContentType::Image),
            error: self.error.clone(),
        }
    }
}

/// Element counts of a processed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: Uuid,
    pub filename: String,
    pub status: ProcessingStatus,
    pub uploaded_at: DateTime<Utc>,
    pub total_elements: usize,
    pub text_elements: usize,
    pub table_elements: usize,
    pub image_elements: usize,
    pub error: Option<String>,
}
