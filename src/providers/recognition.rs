use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::RecognitionProvider;
use crate::language::Language;
use crate::models::RecognizedSpan;

/// Configuration for the speech recognition service client.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Service endpoint accepting audio uploads
    pub endpoint: String,
    /// Model variant the service should use (e.g. "default", "turbo")
    pub model_variant: String,
}

impl RecognitionConfig {
    pub const ENDPOINT_ENV: &'static str = "RECOGNITION_URL";
    const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:8002/transcribe";

    pub fn from_env() -> Self {
        let endpoint = std::env::var(Self::ENDPOINT_ENV)
            .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());
        Self {
            endpoint,
            model_variant: "default".to_string(),
        }
    }

    pub fn new(endpoint: impl Into<String>, model_variant: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model_variant: model_variant.into(),
        }
    }
}

/// HTTP client for the speech recognition model service.
pub struct HttpRecognitionClient {
    client: Client,
    config: RecognitionConfig,
}

impl HttpRecognitionClient {
    pub fn new(config: RecognitionConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl RecognitionProvider for HttpRecognitionClient {
    async fn recognize(&self, audio: &Path, language: Language) -> Result<Vec<RecognizedSpan>> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("Failed to read audio file: {audio:?}"))?;

        let form = reqwest::multipart::Form::new()
            .part(
                "audio",
                reqwest::multipart::Part::bytes(bytes).file_name(
                    audio
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("audio.wav")
                        .to_string(),
                ),
            )
            .text("language", language.code().to_string())
            .text("model", self.config.model_variant.clone());

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to recognition service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Recognition service error: {status} - {body}");
        }

        let response: RecognitionResponse = response
            .json()
            .await
            .context("Failed to parse recognition response")?;

        let mut spans: Vec<RecognizedSpan> = response
            .segments
            .into_iter()
            .map(|s| RecognizedSpan::new(s.text.trim(), s.start, s.end))
            .collect();

        // The wire contract says chronological; enforce it so utterance
        // ordering downstream never depends on service behavior
        spans.sort_by(|a, b| {
            a.interval
                .start
                .partial_cmp(&b.interval.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        info!("Recognition returned {} spans", spans.len());
        Ok(spans)
    }
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    segments: Vec<RecognitionSegment>,
}

#[derive(Debug, Deserialize)]
struct RecognitionSegment {
    start: f64,
    end: f64,
    text: String,
}
