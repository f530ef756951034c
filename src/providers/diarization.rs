use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::DiarizationProvider;
use crate::error::PipelineError;
use crate::models::SpeakerTurn;

/// Configuration for the diarization service client. The access token is
/// mandatory: availability is decided here at construction, never discovered
/// by a failing call later.
#[derive(Debug, Clone)]
pub struct DiarizationConfig {
    /// Service endpoint accepting audio uploads
    pub endpoint: String,
    /// Bearer credential (from DIARIZATION_TOKEN env var)
    pub token: String,
}

impl DiarizationConfig {
    pub const TOKEN_ENV: &'static str = "DIARIZATION_TOKEN";
    pub const ENDPOINT_ENV: &'static str = "DIARIZATION_URL";
    const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:8001/diarize";

    /// Create config from environment variables; fails fast when the
    /// credential is absent.
    pub fn from_env() -> Result<Self, PipelineError> {
        let token = std::env::var(Self::TOKEN_ENV)
            .map_err(|_| PipelineError::MissingCredential(Self::TOKEN_ENV))?;
        let endpoint = std::env::var(Self::ENDPOINT_ENV)
            .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());

        Ok(Self { endpoint, token })
    }

    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

/// HTTP client for the diarization model service.
pub struct HttpDiarizationClient {
    client: Client,
    config: DiarizationConfig,
}

impl HttpDiarizationClient {
    pub fn new(config: DiarizationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl DiarizationProvider for HttpDiarizationClient {
    async fn diarize(
        &self,
        audio: &Path,
        speaker_hint: Option<u32>,
    ) -> Result<Vec<SpeakerTurn>> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("Failed to read audio file: {audio:?}"))?;

        let mut form = reqwest::multipart::Form::new().part(
            "audio",
            reqwest::multipart::Part::bytes(bytes).file_name(
                audio
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.wav")
                    .to_string(),
            ),
        );
        if let Some(hint) = speaker_hint {
            form = form.text("num_speakers", hint.to_string());
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to diarization service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Diarization service error: {status} - {body}");
        }

        let response: DiarizationResponse = response
            .json()
            .await
            .context("Failed to parse diarization response")?;

        let turns: Vec<SpeakerTurn> = response
            .segments
            .into_iter()
            .map(|s| SpeakerTurn::new(s.speaker, s.start, s.end))
            .collect();

        info!(
            "Diarization returned {} turns, {} speakers",
            turns.len(),
            turns
                .iter()
                .map(|t| t.speaker.as_str())
                .collect::<std::collections::HashSet<_>>()
                .len()
        );

        Ok(turns)
    }
}

#[derive(Debug, Deserialize)]
struct DiarizationResponse {
    segments: Vec<DiarizationSegment>,
}

#[derive(Debug, Deserialize)]
struct DiarizationSegment {
    speaker: String,
    start: f64,
    end: f64,
}
