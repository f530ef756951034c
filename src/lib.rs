pub mod align;
pub mod assemble;
pub mod entities;
pub mod error;
pub mod export;
pub mod formats;
pub mod keywords;
pub mod language;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod providers;

pub use align::align_spans;
pub use assemble::{assemble_report, speaker_time_share};
pub use entities::{EntityAnalysis, EntityCategory, EntityMention, EntityTagger};
pub use error::PipelineError;
pub use export::{ExportFormat, ExportWriter, TextOptions};
pub use keywords::{KeywordEngine, KeywordStrategy};
pub use language::Language;
pub use models::{
    Keyword, RecognizedSpan, Report, SpeakerTurn, Stage, StageStatus, TimeInterval, Utterance,
};
pub use normalize::TextNormalizer;
pub use pipeline::{Pipeline, RunOptions, RunOutcome};
pub use providers::{
    AudioSource, DiarizationConfig, DiarizationProvider, FfmpegAudioSource,
    HttpDiarizationClient, HttpRecognitionClient, PreparedAudio, RecognitionConfig,
    RecognitionProvider,
};
