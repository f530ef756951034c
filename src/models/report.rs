use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::entities::EntityAnalysis;
use crate::models::Utterance;

/// A ranked keyword. `score` is `None` when the extraction strategy ranks
/// without producing a numeric weight; consumers must treat that as "ranked
/// but unscored", not as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub score: Option<f64>,
}

/// Pipeline stages, in execution order. Export is not a timed stage: the
/// report is frozen at assembly, and export results are surfaced per format
/// on the run outcome instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AudioExtraction,
    Diarization,
    Recognition,
    Alignment,
    Normalization,
    Keywords,
    Entities,
    Assembly,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::AudioExtraction => "audio_extraction",
            Stage::Diarization => "diarization",
            Stage::Recognition => "recognition",
            Stage::Alignment => "alignment",
            Stage::Normalization => "normalization",
            Stage::Keywords => "keywords",
            Stage::Entities => "entities",
            Stage::Assembly => "assembly",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Failed,
}

/// Wall-clock timing for one executed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: Stage,
    pub duration_secs: f64,
    pub status: StageStatus,
}

/// Run-level metadata attached to the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Unique identifier for this run
    pub run_id: String,
    /// Source media file the run started from
    pub source: PathBuf,
    /// Language code the run was performed with
    pub language: String,
    /// When the report was assembled (RFC 3339)
    pub generated_at: String,
    /// Total wall-clock processing time in seconds
    pub processing_secs: f64,
    /// Duration of the decoded audio in seconds
    pub audio_duration_secs: f64,
}

/// Statistics derived from the post-alignment, post-cleaning utterance
/// sequence, never from raw collaborator output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub total_utterances: usize,
    /// Word count over cleaned text, whitespace-split
    pub total_words: usize,
    /// Max end time across utterances
    pub total_duration_secs: f64,
    /// Sorted unique speaker labels observed on utterances
    pub speakers: Vec<String>,
}

/// The terminal aggregate of one pipeline run. Immutable once assembled;
/// exported, never further mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub statistics: ReportStatistics,
    pub keywords: Vec<Keyword>,
    /// Cumulative speaking time per speaker, from the diarization turns
    pub speaker_time: BTreeMap<String, f64>,
    pub entities: EntityAnalysis,
    pub utterances: Vec<Utterance>,
    pub stage_timings: Vec<StageTiming>,
}
