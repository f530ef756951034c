use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::align::align_spans;
use crate::assemble::assemble_report;
use crate::entities::EntityTagger;
use crate::error::PipelineError;
use crate::export::{ExportFormat, ExportWriter};
use crate::formats::is_supported_file;
use crate::keywords::{KeywordEngine, KeywordStrategy};
use crate::language::Language;
use crate::models::{Report, ReportMetadata, Stage, StageStatus, StageTiming};
use crate::normalize::TextNormalizer;
use crate::providers::{AudioSource, DiarizationProvider, RecognitionProvider};

/// Per-run options supplied by the caller. Strategy and formats arrive as
/// typed enums, so unknown names have already been rejected by parsing.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub language: Language,
    /// Expected speaker count, forwarded to the diarization provider
    pub speaker_hint: Option<u32>,
    pub keyword_strategy: KeywordStrategy,
    /// Number of keywords to extract; zero disables extraction
    pub top_keywords: usize,
    /// Export formats to write, in order
    pub formats: Vec<ExportFormat>,
}

impl RunOptions {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            speaker_hint: None,
            keyword_strategy: KeywordStrategy::FrequencyWeighted,
            top_keywords: 10,
            formats: vec![ExportFormat::Json, ExportFormat::Text],
        }
    }
}

/// Result of one successful run. Export failures are reported per format and
/// do not invalidate the report or formats written earlier.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    /// Formats written, with their paths
    pub written: Vec<(ExportFormat, PathBuf)>,
    /// Formats that failed to write
    pub failed_exports: Vec<(ExportFormat, PipelineError)>,
}

/// Sequences the collaborator calls and processing stages for one media
/// file. Holds only read-only configuration and provider handles; construct
/// one per run or per batch, there is no implicit shared state.
pub struct Pipeline<A, D, R> {
    audio: A,
    diarizer: D,
    recognizer: R,
    exporter: ExportWriter,
}

impl<A, D, R> Pipeline<A, D, R>
where
    A: AudioSource,
    D: DiarizationProvider,
    R: RecognitionProvider,
{
    pub fn new(audio: A, diarizer: D, recognizer: R, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio,
            diarizer,
            recognizer,
            exporter: ExportWriter::new(output_dir),
        }
    }

    /// Run the full pipeline for one media file.
    ///
    /// Stages run strictly forward: audio extraction, diarization,
    /// recognition, alignment, normalization, keyword extraction, entity
    /// tagging, assembly, export. Caller errors are raised before any stage
    /// executes; a collaborator failure carries the stage it occurred in and
    /// is not retried here.
    pub async fn run(
        &self,
        media: &Path,
        options: &RunOptions,
    ) -> Result<RunOutcome, PipelineError> {
        if !media.exists() {
            return Err(PipelineError::InputNotFound(media.to_path_buf()));
        }
        if !is_supported_file(media) {
            return Err(PipelineError::UnsupportedMedia(media.to_path_buf()));
        }

        let run_started = Instant::now();
        let mut timings: Vec<StageTiming> = Vec::new();
        info!("Starting pipeline for {:?} (language: {})", media, options.language);

        let audio = timed(&mut timings, Stage::AudioExtraction, async {
            self.audio.prepare(media).await
        })
        .await?;

        let mut turns = timed(&mut timings, Stage::Diarization, async {
            self.diarizer.diarize(&audio.path, options.speaker_hint).await
        })
        .await?;
        // Stable turn order makes the alignment tie-break deterministic
        turns.sort_by(|a, b| {
            a.interval
                .start
                .partial_cmp(&b.interval.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let spans = timed(&mut timings, Stage::Recognition, async {
            self.recognizer.recognize(&audio.path, options.language).await
        })
        .await?;

        let stage_started = Instant::now();
        let mut utterances = align_spans(&spans, &turns);
        push_completed(&mut timings, Stage::Alignment, stage_started);
        info!("Aligned {} spans against {} turns", spans.len(), turns.len());

        let stage_started = Instant::now();
        let normalizer = TextNormalizer::new(options.language);
        for utterance in &mut utterances {
            utterance.text = normalizer.clean(&utterance.original_text);
        }
        push_completed(&mut timings, Stage::Normalization, stage_started);

        // Keyword extraction and entity tagging are pure over the finished
        // utterance sequence; assembly waits on both
        let stage_started = Instant::now();
        let keywords = KeywordEngine::new(options.language).extract(
            &utterances,
            options.keyword_strategy,
            options.top_keywords,
        );
        push_completed(&mut timings, Stage::Keywords, stage_started);
        info!("Extracted {} keywords ({})", keywords.len(), options.keyword_strategy.name());

        let stage_started = Instant::now();
        let entities = EntityTagger::new().analyze_batch(&utterances);
        push_completed(&mut timings, Stage::Entities, stage_started);
        info!(
            "Entity tagging: {}/{} utterances domain-related",
            entities.related_utterances, entities.total_utterances
        );

        let stage_started = Instant::now();
        let metadata = ReportMetadata {
            run_id: Uuid::new_v4().to_string(),
            source: media.to_path_buf(),
            language: options.language.code().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            processing_secs: run_started.elapsed().as_secs_f64(),
            audio_duration_secs: audio.duration_secs,
        };
        push_completed(&mut timings, Stage::Assembly, stage_started);
        let report = assemble_report(metadata, utterances, keywords, &turns, entities, timings);

        let base = media
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let mut written = Vec::new();
        let mut failed_exports = Vec::new();
        for &format in &options.formats {
            match self.exporter.write(&report, base, format) {
                Ok(path) => written.push((format, path)),
                Err(err) => {
                    warn!("Export failed: {err}");
                    failed_exports.push((format, err));
                }
            }
        }

        info!(
            "Pipeline completed in {:.2}s ({} exports written, {} failed)",
            run_started.elapsed().as_secs_f64(),
            written.len(),
            failed_exports.len()
        );

        Ok(RunOutcome {
            report,
            written,
            failed_exports,
        })
    }

    /// Process several files sequentially with the same options. One file's
    /// failure is reported in its slot and does not abort the others.
    pub async fn run_batch(
        &self,
        inputs: &[PathBuf],
        options: &RunOptions,
    ) -> Vec<(PathBuf, Result<RunOutcome, PipelineError>)> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = self.run(input, options).await;
            if let Err(err) = &result {
                warn!("Run failed for {:?}: {err}", input);
            }
            results.push((input.clone(), result));
        }
        results
    }
}

/// Await a collaborator call, recording its timing and wrapping any failure
/// with the stage it occurred in.
async fn timed<T>(
    timings: &mut Vec<StageTiming>,
    stage: Stage,
    call: impl Future<Output = anyhow::Result<T>>,
) -> Result<T, PipelineError> {
    let started = Instant::now();
    match call.await {
        Ok(value) => {
            push_completed(timings, stage, started);
            Ok(value)
        }
        Err(source) => {
            timings.push(StageTiming {
                stage,
                duration_secs: started.elapsed().as_secs_f64(),
                status: StageStatus::Failed,
            });
            Err(PipelineError::collaborator(stage, source))
        }
    }
}

fn push_completed(timings: &mut Vec<StageTiming>, stage: Stage, started: Instant) {
    timings.push(StageTiming {
        stage,
        duration_secs: started.elapsed().as_secs_f64(),
        status: StageStatus::Completed,
    });
}
