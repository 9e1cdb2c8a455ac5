use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Standard,
    Enhanced,
}

/// Sectioned summary: bullet summary, top three key points and insights
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnhancedSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub insights: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub transcript_words: usize,
    pub summary_words: usize,
    /// Percentage of words removed, one decimal. None for an empty transcript.
    pub compression_percent: Option<f64>,
    pub sentences: usize,
}

impl SummaryStats {
    pub fn compute(transcript: &str, summary: &str) -> Self {
        let transcript_words = transcript.split_whitespace().count();
        let summary_words = summary.split_whitespace().count();

        let compression_percent = (transcript_words > 0).then(|| {
            let ratio = 1.0 - summary_words as f64 / transcript_words as f64;
            (ratio * 1000.0).round() / 10.0
        });

        let sentences = transcript.split('.').filter(|s| !s.trim().is_empty()).count();

        Self {
            transcript_words,
            summary_words,
            compression_percent,
            sentences,
        }
    }
}
