use axum::{extract::State, response::Json};
use fluxora_models::{AnalysisType, EnhancedSummary, SummaryStats};
use fluxora_utils::{validate_model, validate_youtube_url, FluxoraError, FluxoraResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use validator::Validate;

use crate::{extract_video_id, youtube_to_transcript, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct VideoSummaryBody {
    #[validate(length(min = 1, message = "Please enter a YouTube URL"))]
    pub url: String,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub save_transcript: bool,
}

#[derive(Debug, Serialize)]
pub struct VideoSummaryResponse {
    pub video_id: String,
    pub analysis_type: AnalysisType,
    #[serde(flatten)]
    pub analysis: EnhancedSummary,
    pub stats: SummaryStats,
    pub transcript: String,
    pub transcript_file: Option<String>,
}

pub async fn summarize_video(
    State(state): State<AppState>,
    Json(body): Json<VideoSummaryBody>,
) -> FluxoraResult<Json<VideoSummaryResponse>> {
    validate_model(&body)?;
    let url = body.url.trim();
    validate_youtube_url(url)?;
    let video_id = extract_video_id(url)?;

    let transcript =
        youtube_to_transcript(state.audio.as_ref(), state.transcriber.as_ref(), url).await?;
    if transcript.trim().chars().count() < state.media.min_transcript_chars {
        return Err(FluxoraError::validation(
            "url",
            "Could not get a valid transcript from the video. The video might not have audio or may be unavailable.",
        ));
    }

    let analysis = state.summarizer.analyze(&transcript, body.analysis_type).await?;
    let stats = SummaryStats::compute(&transcript, &analysis.summary);

    let transcript_file = if body.save_transcript {
        match save_transcript(Path::new(&state.media.transcript_dir), &video_id, &transcript).await {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                warn!(%video_id, error = %e, "Could not save transcript");
                None
            }
        }
    } else {
        None
    };

    info!(
        %video_id,
        analysis_type = ?body.analysis_type,
        transcript_words = stats.transcript_words,
        summary_words = stats.summary_words,
        "Summarized video"
    );

    Ok(Json(VideoSummaryResponse {
        video_id,
        analysis_type: body.analysis_type,
        analysis,
        stats,
        transcript,
        transcript_file,
    }))
}

/// Writes `transcript_{id}.txt` under `dir`. `video_id` must come from
/// [`extract_video_id`].
pub async fn save_transcript(dir: &Path, video_id: &str, transcript: &str) -> FluxoraResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("transcript_{}.txt", video_id));
    tokio::fs::write(&path, transcript).await?;
    Ok(path)
}

#[derive(Debug, Deserialize)]
pub struct TextSummaryBody {
    pub text: String,
    #[serde(default)]
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Serialize)]
pub struct TextSummaryResponse {
    pub analysis_type: AnalysisType,
    #[serde(flatten)]
    pub analysis: EnhancedSummary,
    pub stats: SummaryStats,
}

pub async fn summarize_text(
    State(state): State<AppState>,
    Json(body): Json<TextSummaryBody>,
) -> FluxoraResult<Json<TextSummaryResponse>> {
    let analysis = state.summarizer.analyze(&body.text, body.analysis_type).await?;
    let stats = SummaryStats::compute(&body.text, &analysis.summary);

    Ok(Json(TextSummaryResponse {
        analysis_type: body.analysis_type,
        analysis,
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{router, AudioSource, Summarizer, Transcriber};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use fluxora_llm::testing::ScriptedChatModel;
    use fluxora_llm::PromptLibrary;
    use fluxora_utils::AppConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const TRANSCRIPT: &str = "Welcome to the channel. Today we look at ownership in Rust. \
        Every value has a single owner. Borrowing lets code read without taking ownership.";

    struct TempAudio {
        dir: PathBuf,
    }

    #[async_trait]
    impl AudioSource for TempAudio {
        async fn download(&self, url: &str) -> FluxoraResult<PathBuf> {
            let path = self.dir.join(format!("{}.wav", extract_video_id(url)?));
            tokio::fs::write(&path, b"RIFF").await?;
            Ok(path)
        }
    }

    struct FixedTranscript(&'static str);

    #[async_trait]
    impl Transcriber for FixedTranscript {
        async fn transcribe(&self, _audio: &Path) -> FluxoraResult<String> {
            Ok(self.0.to_string())
        }
    }

    fn app(dir: &Path, transcript: &'static str, reply: &str) -> Router {
        let mut media = AppConfig::default().media;
        media.transcript_dir = dir.join("transcripts").display().to_string();

        router(AppState {
            audio: Arc::new(TempAudio { dir: dir.to_path_buf() }),
            transcriber: Arc::new(FixedTranscript(transcript)),
            summarizer: Summarizer::new(
                Arc::new(ScriptedChatModel::always(reply)),
                Arc::new(PromptLibrary::new().unwrap()),
            ),
            media,
        })
    }

    async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_enhanced_video_summary_saves_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let reply = "SUMMARY:\n- Ownership rules\n\nKEY POINTS:\n1. One owner\n2. Borrowing\n3. Moves\n\nINSIGHTS:\nPractice helps.";
        let (status, json) = post(
            app(dir.path(), TRANSCRIPT, reply),
            "/api/v1/videos/summarize",
            json!({
                "url": "https://www.youtube.com/watch?v=abc123&t=5",
                "analysis_type": "enhanced",
                "save_transcript": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["video_id"], "abc123");
        assert_eq!(json["summary"], "- Ownership rules\n");
        assert_eq!(json["key_points"].as_array().unwrap().len(), 3);
        assert_eq!(json["insights"], "Practice helps. ");
        assert_eq!(json["stats"]["summary_words"], 3);
        assert_eq!(json["stats"]["sentences"], 4);

        let saved = dir.path().join("transcripts").join("transcript_abc123.txt");
        assert_eq!(json["transcript_file"], saved.display().to_string());
        assert_eq!(tokio::fs::read_to_string(saved).await.unwrap(), TRANSCRIPT);
        assert!(!dir.path().join("abc123.wav").exists());
    }

    #[tokio::test]
    async fn test_short_transcript_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(
            app(dir.path(), "Too short.", "unused"),
            "/api/v1/videos/summarize",
            json!({ "url": "https://youtu.be/abc123" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Could not get a valid transcript"));
    }

    #[tokio::test]
    async fn test_non_youtube_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(
            app(dir.path(), TRANSCRIPT, "unused"),
            "/api/v1/videos/summarize",
            json!({ "url": "https://vimeo.com/12345" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Please enter a valid YouTube URL");
    }

    #[tokio::test]
    async fn test_path_like_video_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(
            app(dir.path(), TRANSCRIPT, "unused"),
            "/api/v1/videos/summarize",
            json!({
                "url": "https://www.youtube.com/watch?v=../../x",
                "save_transcript": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(!dir.path().join("transcripts").exists());
    }

    #[tokio::test]
    async fn test_standard_text_summary() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(
            app(dir.path(), TRANSCRIPT, "- Ownership in Rust"),
            "/api/v1/texts/summarize",
            json!({ "text": TRANSCRIPT }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["analysis_type"], "standard");
        assert_eq!(json["summary"], "- Ownership in Rust");
        assert_eq!(json["key_points"], json!([]));
        assert_eq!(json["stats"]["transcript_words"], 24);
    }

    #[tokio::test]
    async fn test_empty_text_summary() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(
            app(dir.path(), TRANSCRIPT, "unused"),
            "/api/v1/texts/summarize",
            json!({ "text": "   " }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"], "File is empty or unreadable.");
        assert_eq!(json["stats"]["compression_percent"], Value::Null);
    }
}
