pub mod audio;
pub mod diarization;
pub mod recognition;

pub use audio::FfmpegAudioSource;
pub use diarization::{DiarizationConfig, HttpDiarizationClient};
pub use recognition::{HttpRecognitionClient, RecognitionConfig};

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::language::Language;
use crate::models::{RecognizedSpan, SpeakerTurn};

/// A decoded, mono, fixed-sample-rate audio file ready for the model
/// providers.
#[derive(Debug, Clone)]
pub struct PreparedAudio {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Produces a decoded audio file from a media file. Long-running and
/// blocking at this layer; there is no mid-call cancellation contract.
#[allow(async_fn_in_trait)]
pub trait AudioSource {
    async fn prepare(&self, media: &Path) -> Result<PreparedAudio>;
}

/// External diarization model. Returns turns in no guaranteed order; the
/// pipeline sorts them by start time before alignment.
#[allow(async_fn_in_trait)]
pub trait DiarizationProvider {
    async fn diarize(
        &self,
        audio: &Path,
        speaker_hint: Option<u32>,
    ) -> Result<Vec<SpeakerTurn>>;
}

/// External speech recognition model. Spans come back in chronological
/// order; utterance ordering downstream depends on it.
#[allow(async_fn_in_trait)]
pub trait RecognitionProvider {
    async fn recognize(&self, audio: &Path, language: Language) -> Result<Vec<RecognizedSpan>>;
}
