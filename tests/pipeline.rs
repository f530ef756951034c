use std::path::{Path, PathBuf};

use anyhow::Result;

use colloquy::export::parse_csv;
use colloquy::models::{RecognizedSpan, Report, SpeakerTurn};
use colloquy::providers::{AudioSource, DiarizationProvider, PreparedAudio, RecognitionProvider};
use colloquy::{ExportFormat, KeywordStrategy, Language, Pipeline, PipelineError, RunOptions};

/// Hands the media file straight through as prepared audio.
struct PassthroughAudio;

impl AudioSource for PassthroughAudio {
    async fn prepare(&self, media: &Path) -> Result<PreparedAudio> {
        Ok(PreparedAudio {
            path: media.to_path_buf(),
            duration_secs: 12.0,
        })
    }
}

struct FixedDiarizer {
    turns: Vec<SpeakerTurn>,
}

impl DiarizationProvider for FixedDiarizer {
    async fn diarize(&self, _audio: &Path, _hint: Option<u32>) -> Result<Vec<SpeakerTurn>> {
        Ok(self.turns.clone())
    }
}

struct FixedRecognizer {
    spans: Vec<RecognizedSpan>,
}

impl RecognitionProvider for FixedRecognizer {
    async fn recognize(&self, _audio: &Path, _language: Language) -> Result<Vec<RecognizedSpan>> {
        Ok(self.spans.clone())
    }
}

struct FailingRecognizer;

impl RecognitionProvider for FailingRecognizer {
    async fn recognize(&self, _audio: &Path, _language: Language) -> Result<Vec<RecognizedSpan>> {
        anyhow::bail!("model service unavailable")
    }
}

fn media_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"fake audio bytes").unwrap();
    path
}

fn conversation_turns() -> Vec<SpeakerTurn> {
    vec![
        SpeakerTurn::new("SPEAKER_A", 0.0, 5.0),
        SpeakerTurn::new("SPEAKER_B", 5.0, 12.0),
    ]
}

fn conversation_spans() -> Vec<RecognizedSpan> {
    vec![
        RecognizedSpan::new("um the engine light came on yesterday", 0.5, 4.5),
        RecognizedSpan::new("sounds like a sensor fault in the engine", 5.5, 11.0),
    ]
}

#[tokio::test]
async fn full_run_writes_reports_and_attributes_speakers() {
    let workdir = tempfile::tempdir().unwrap();
    let output_dir = workdir.path().join("out");
    let media = media_file(workdir.path(), "meeting.wav");

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer {
            turns: conversation_turns(),
        },
        FixedRecognizer {
            spans: conversation_spans(),
        },
        &output_dir,
    );

    let mut options = RunOptions::new(Language::En);
    options.formats = vec![
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Text,
        ExportFormat::Plain,
    ];

    let outcome = pipeline.run(&media, &options).await.unwrap();
    assert!(outcome.failed_exports.is_empty());
    assert_eq!(outcome.written.len(), 4);

    let report = &outcome.report;
    assert_eq!(report.statistics.total_utterances, 2);
    assert_eq!(
        report.statistics.speakers,
        vec!["SPEAKER_A".to_string(), "SPEAKER_B".to_string()]
    );
    assert_eq!(report.metadata.language, "en");
    assert_eq!(report.metadata.audio_duration_secs, 12.0);

    // Fillers removed from cleaned text, original preserved
    assert_eq!(
        report.utterances[0].text,
        "the engine light came on yesterday"
    );
    assert_eq!(
        report.utterances[0].original_text,
        "um the engine light came on yesterday"
    );
    assert_eq!(report.utterances[0].speaker.as_deref(), Some("SPEAKER_A"));
    assert_eq!(report.utterances[1].speaker.as_deref(), Some("SPEAKER_B"));

    // Both utterances mention the engine, so the domain tagger sees them
    assert_eq!(report.entities.related_utterances, 2);

    // Every timed stage is recorded once, in execution order, and the
    // report carries nothing for export (surfaced on the outcome instead)
    use colloquy::Stage;
    let stages: Vec<Stage> = report.stage_timings.iter().map(|t| t.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::AudioExtraction,
            Stage::Diarization,
            Stage::Recognition,
            Stage::Alignment,
            Stage::Normalization,
            Stage::Keywords,
            Stage::Entities,
            Stage::Assembly,
        ]
    );

    // Deterministic filenames under the output directory
    let json_path = output_dir.join("meeting_report.json");
    let csv_path = output_dir.join("meeting_segments.csv");
    assert!(json_path.is_file());
    assert!(csv_path.is_file());
    assert!(output_dir.join("meeting_transcript.txt").is_file());
    assert!(output_dir.join("meeting_plain.txt").is_file());

    // The JSON export parses back into the same report shape
    let parsed: Report =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed.statistics.total_utterances, 2);
    assert_eq!(parsed.utterances[1].text, report.utterances[1].text);

    // The CSV export round-trips through the tabular parser
    let rows = parse_csv(&std::fs::read_to_string(&csv_path).unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].speaker.as_deref(), Some("SPEAKER_A"));
    // "like" is filtered as a filler token in the cleaned column
    assert_eq!(rows[1].text, "sounds a sensor fault in the engine");
}

#[tokio::test]
async fn missing_input_is_rejected_before_any_stage() {
    let workdir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer { turns: vec![] },
        FixedRecognizer { spans: vec![] },
        workdir.path().join("out"),
    );

    let err = pipeline
        .run(
            &workdir.path().join("nope.wav"),
            &RunOptions::new(Language::En),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InputNotFound(_)));
}

#[tokio::test]
async fn unsupported_media_is_rejected_before_any_stage() {
    let workdir = tempfile::tempdir().unwrap();
    let media = media_file(workdir.path(), "notes.pdf");

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer { turns: vec![] },
        FixedRecognizer { spans: vec![] },
        workdir.path().join("out"),
    );

    let err = pipeline
        .run(&media, &RunOptions::new(Language::En))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedMedia(_)));
}

#[tokio::test]
async fn collaborator_failure_names_the_stage() {
    let workdir = tempfile::tempdir().unwrap();
    let media = media_file(workdir.path(), "meeting.wav");

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer {
            turns: conversation_turns(),
        },
        FailingRecognizer,
        workdir.path().join("out"),
    );

    let err = pipeline
        .run(&media, &RunOptions::new(Language::En))
        .await
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some(colloquy::Stage::Recognition));
    assert!(err.to_string().contains("recognition"));
}

#[tokio::test]
async fn empty_recognition_yields_a_degenerate_report() {
    let workdir = tempfile::tempdir().unwrap();
    let output_dir = workdir.path().join("out");
    let media = media_file(workdir.path(), "silence.mp3");

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer {
            turns: conversation_turns(),
        },
        FixedRecognizer { spans: vec![] },
        &output_dir,
    );

    let outcome = pipeline
        .run(&media, &RunOptions::new(Language::En))
        .await
        .unwrap();

    let report = &outcome.report;
    assert_eq!(report.statistics.total_utterances, 0);
    assert_eq!(report.statistics.total_words, 0);
    assert_eq!(report.statistics.total_duration_secs, 0.0);
    assert!(report.statistics.speakers.is_empty());
    assert!(report.keywords.is_empty());
    assert!(report.entities.summary.is_empty());
    // Speaker time still reflects the diarization turns
    assert_eq!(report.speaker_time.get("SPEAKER_A"), Some(&5.0));
    assert!(output_dir.join("silence_report.json").is_file());
}

#[tokio::test]
async fn graph_ranked_keywords_come_back_unscored() {
    let workdir = tempfile::tempdir().unwrap();
    let media = media_file(workdir.path(), "meeting.wav");

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer {
            turns: conversation_turns(),
        },
        FixedRecognizer {
            spans: conversation_spans(),
        },
        workdir.path().join("out"),
    );

    let mut options = RunOptions::new(Language::En);
    options.keyword_strategy = KeywordStrategy::GraphRanked;
    options.formats = vec![ExportFormat::Json];

    let outcome = pipeline.run(&media, &options).await.unwrap();
    assert!(!outcome.report.keywords.is_empty());
    assert!(outcome.report.keywords.iter().all(|k| k.score.is_none()));
}

#[tokio::test]
async fn export_failure_does_not_fail_the_run() {
    let workdir = tempfile::tempdir().unwrap();
    let media = media_file(workdir.path(), "meeting.wav");

    // Occupy the output directory path with a regular file so writes fail
    let blocked = workdir.path().join("blocked");
    std::fs::write(&blocked, b"in the way").unwrap();

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer {
            turns: conversation_turns(),
        },
        FixedRecognizer {
            spans: conversation_spans(),
        },
        &blocked,
    );

    let outcome = pipeline
        .run(&media, &RunOptions::new(Language::En))
        .await
        .unwrap();

    assert!(outcome.written.is_empty());
    assert_eq!(outcome.failed_exports.len(), 2);
    // The in-memory report survives the export failures
    assert_eq!(outcome.report.statistics.total_utterances, 2);
}

#[tokio::test]
async fn batch_isolates_per_file_failures() {
    let workdir = tempfile::tempdir().unwrap();
    let good = media_file(workdir.path(), "first.wav");
    let missing = workdir.path().join("second.wav");

    let pipeline = Pipeline::new(
        PassthroughAudio,
        FixedDiarizer {
            turns: conversation_turns(),
        },
        FixedRecognizer {
            spans: conversation_spans(),
        },
        workdir.path().join("out"),
    );

    let inputs = vec![good.clone(), missing.clone()];
    let results = pipeline
        .run_batch(&inputs, &RunOptions::new(Language::En))
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, good);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, missing);
    assert!(matches!(
        results[1].1,
        Err(PipelineError::InputNotFound(_))
    ));
}
