//! Speech-to-text through Deepgram's prerecorded audio API.

use async_trait::async_trait;
use fluxora_utils::{metrics, DeepgramConfig, FluxoraError, FluxoraResult};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::download::AudioSource;

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> FluxoraResult<String>;
}

#[derive(Clone)]
pub struct DeepgramTranscriber {
    client: Client,
    config: DeepgramConfig,
}

impl DeepgramTranscriber {
    pub fn new(config: DeepgramConfig) -> FluxoraResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FluxoraError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn listen_url(&self) -> String {
        format!(
            "{}/listen?punctuate={}",
            self.config.api_url.trim_end_matches('/'),
            self.config.punctuate
        )
    }
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    async fn transcribe(&self, audio: &Path) -> FluxoraResult<String> {
        let api_key = self.config.api_key.trim();
        if api_key.is_empty() {
            return Err(FluxoraError::configuration(
                "DEEPGRAM_API_KEY environment variable is required",
            ));
        }

        let bytes = tokio::fs::read(audio).await?;
        debug!(path = %audio.display(), bytes = bytes.len(), "Sending audio to Deepgram");

        let response = self
            .client
            .post(self.listen_url())
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", api_key))
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(bytes)
            .send()
            .await
            .map_err(|e| FluxoraError::external_service("Deepgram", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FluxoraError::transcription(format!(
                "Deepgram API error (HTTP {}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: ListenResponse = response
            .json()
            .await
            .map_err(|e| FluxoraError::transcription(format!("Unexpected Deepgram response: {}", e)))?;
        body.transcript()
    }
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl ListenResponse {
    /// First alternative of the first channel.
    fn transcript(self) -> FluxoraResult<String> {
        self.results
            .channels
            .into_iter()
            .next()
            .and_then(|channel| channel.alternatives.into_iter().next())
            .map(|alternative| alternative.transcript)
            .ok_or_else(|| FluxoraError::transcription("Deepgram returned no transcript"))
    }
}

/// Download the audio, transcribe it and remove the WAV whatever the outcome.
pub async fn youtube_to_transcript(
    source: &dyn AudioSource,
    transcriber: &dyn Transcriber,
    url: &str,
) -> FluxoraResult<String> {
    let audio = source.download(url).await?;
    let result = transcriber.transcribe(&audio).await;

    match tokio::fs::remove_file(&audio).await {
        Ok(()) => debug!(path = %audio.display(), "Cleaned up audio file"),
        Err(e) => warn!(path = %audio.display(), error = %e, "Could not remove audio file"),
    }

    metrics::TRANSCRIPTIONS
        .with_label_values(&[metrics::outcome(result.is_ok())])
        .inc();
    if let Ok(transcript) = &result {
        info!(url, chars = transcript.len(), "Transcription complete");
    }
    result
}
