//! Audio extraction from YouTube videos with yt-dlp.

use async_trait::async_trait;
use fluxora_utils::{FluxoraError, FluxoraResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

const VIDEO_ID_LENGTH: std::ops::RangeInclusive<usize> = 6..=20;

/// Video id used to name downloaded audio and saved transcripts.
///
/// `v=` query parameter up to `&`, else the `youtu.be/` path up to `?`,
/// else the last path segment up to `?`. The id ends up in file names, so
/// only 6 to 20 characters of `[A-Za-z0-9_-]` are accepted.
pub fn extract_video_id(url: &str) -> FluxoraResult<String> {
    let url = url.trim();
    let id = if let Some((_, rest)) = url.split_once("v=") {
        rest.split('&').next()
    } else if let Some((_, rest)) = url.split_once("youtu.be/") {
        rest.split('?').next()
    } else {
        url.rsplit('/').next().and_then(|segment| segment.split('?').next())
    }
    .unwrap_or_default();

    let well_formed = VIDEO_ID_LENGTH.contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !well_formed {
        return Err(FluxoraError::validation(
            "url",
            "Could not find a valid YouTube video id in the URL",
        ));
    }
    Ok(id.to_string())
}

/// Fetches the audio track of a video as a local WAV file.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn download(&self, url: &str) -> FluxoraResult<PathBuf>;
}

pub struct YtDlp {
    binary: String,
    output_dir: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl AudioSource for YtDlp {
    async fn download(&self, url: &str) -> FluxoraResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let output_dir = if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            std::env::current_dir()?.join(&self.output_dir)
        };

        let video_id = extract_video_id(url)?;
        let template = output_dir
            .join(format!("{}.%(ext)s", video_id))
            .to_string_lossy()
            .to_string();

        info!(url, %video_id, "Downloading audio");
        let output = Command::new(&self.binary)
            .args([
                "-f",
                "bestaudio/best",
                "-x",
                "--audio-format",
                "wav",
                "-o",
                &template,
                "--no-playlist",
                "--quiet",
            ])
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| FluxoraError::download(format!("Failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(%video_id, stderr = %stderr, "yt-dlp failed");
            return Err(FluxoraError::download(format!(
                "Error downloading YouTube audio: {}",
                stderr.trim()
            )));
        }

        locate_audio(&output_dir, &video_id).await
    }
}

/// `{id}.wav` when present, otherwise any file whose name starts with the id.
pub async fn locate_audio(dir: &Path, video_id: &str) -> FluxoraResult<PathBuf> {
    let expected = dir.join(format!("{}.wav", video_id));
    if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
        debug!(path = %expected.display(), "Audio downloaded");
        return Ok(expected);
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if !video_id.is_empty() && name.starts_with(video_id) {
            debug!(path = %entry.path().display(), "Audio downloaded under another name");
            return Ok(entry.path());
        }
        files.push(name);
    }

    files.sort();
    Err(FluxoraError::download(format!(
        "WAV file not found. Expected: {}, Files in directory: {:?}",
        expected.display(),
        files
    )))
}
