use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::models::{Report, Utterance};

/// Output representations of a report. An unrecognized format name is a
/// caller error, not silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Full structured record (JSON)
    Json,
    /// Row-per-utterance tabular file (CSV)
    Csv,
    /// Human-readable transcript with timestamps and speaker labels
    Text,
    /// Continuous plain text with no metadata
    Plain,
}

impl ExportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
            ExportFormat::Plain => "plain",
        }
    }

    /// Deterministic output filename for a given input base name.
    pub fn filename(&self, base: &str) -> String {
        match self {
            ExportFormat::Json => format!("{base}_report.json"),
            ExportFormat::Csv => format!("{base}_segments.csv"),
            ExportFormat::Text => format!("{base}_transcript.txt"),
            ExportFormat::Plain => format!("{base}_plain.txt"),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Text),
            "plain" => Ok(ExportFormat::Plain),
            other => Err(PipelineError::UnknownExportFormat(other.to_string())),
        }
    }
}

/// Serializes reports into the requested representations under one output
/// directory. Rendering is pure; writing the file is the only side effect,
/// and a failure in one format leaves previously written formats intact.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    output_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write one format. The output directory is created if absent; the
    /// filename derives deterministically from `base` and the format.
    pub fn write(
        &self,
        report: &Report,
        base: &str,
        format: ExportFormat,
    ) -> Result<PathBuf, PipelineError> {
        let path = self.output_dir.join(format.filename(base));

        let content = match format {
            ExportFormat::Json => render_json(report)?,
            ExportFormat::Csv => render_csv(&report.utterances),
            ExportFormat::Text => render_transcript(&report.utterances, &TextOptions::default()),
            ExportFormat::Plain => render_plain(&report.utterances),
        };

        std::fs::create_dir_all(&self.output_dir).map_err(|source| {
            PipelineError::ExportWrite {
                format: format.name(),
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&path, content).map_err(|source| PipelineError::ExportWrite {
            format: format.name(),
            path: path.clone(),
            source,
        })?;

        info!("{} export written to {:?}", format, path);
        Ok(path)
    }
}

/// Toggles for the human-readable transcript.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub timestamps: bool,
    pub speakers: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            timestamps: true,
            speakers: true,
        }
    }
}

fn render_json(report: &Report) -> Result<String, PipelineError> {
    // serde_json only fails here on non-string map keys or similar model
    // bugs; surface it as an export failure rather than panicking
    serde_json::to_string_pretty(report).map_err(|e| PipelineError::ExportWrite {
        format: ExportFormat::Json.name(),
        path: PathBuf::new(),
        source: std::io::Error::other(e),
    })
}

/// Row-per-utterance CSV: `start,end,speaker,text,original_text`.
pub fn render_csv(utterances: &[Utterance]) -> String {
    let mut out = String::from("start,end,speaker,text,original_text\n");
    for u in utterances {
        out.push_str(&format!(
            "{:.3},{:.3},{},{},{}\n",
            u.interval.start,
            u.interval.end,
            csv_field(u.speaker.as_deref().unwrap_or("")),
            csv_field(&u.text),
            csv_field(&u.original_text),
        ));
    }
    out
}

/// Human-readable transcript, one utterance per line:
/// `[HH:MM:SS - HH:MM:SS] SPEAKER: text`.
pub fn render_transcript(utterances: &[Utterance], options: &TextOptions) -> String {
    let mut out = String::new();
    for u in utterances {
        let mut parts: Vec<String> = Vec::new();

        if options.timestamps {
            parts.push(format!(
                "[{} - {}]",
                format_timestamp(u.interval.start),
                format_timestamp(u.interval.end)
            ));
        }
        if options.speakers {
            if let Some(speaker) = &u.speaker {
                parts.push(format!("{speaker}:"));
            }
        }
        parts.push(u.text.clone());

        out.push_str(parts.join(" ").trim_end());
        out.push('\n');
        if options.timestamps || options.speakers {
            out.push('\n');
        }
    }
    out
}

/// Continuous plain text: cleaned utterance texts joined with spaces, no
/// timestamps or speaker labels.
pub fn render_plain(utterances: &[Utterance]) -> String {
    utterances
        .iter()
        .map(|u| u.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One parsed row of the tabular export, for consumers importing a CSV back.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRow {
    pub start: f64,
    pub end: f64,
    pub speaker: Option<String>,
    pub text: String,
    pub original_text: String,
}

/// Parse the tabular export back into rows. The inverse of [`render_csv`]
/// modulo the declared column typing (times at millisecond precision).
pub fn parse_csv(content: &str) -> Vec<TabularRow> {
    split_csv_records(content)
        .into_iter()
        .skip(1)
        .filter_map(|fields| {
            if fields.len() != 5 {
                return None;
            }
            Some(TabularRow {
                start: fields[0].parse().ok()?,
                end: fields[1].parse().ok()?,
                speaker: if fields[2].is_empty() {
                    None
                } else {
                    Some(fields[2].clone())
                },
                text: fields[3].clone(),
                original_text: fields[4].clone(),
            })
        })
        .collect()
}

/// Quote a CSV field when it needs it, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split CSV content into records of fields. Quote state carries across
/// line boundaries, so a quoted field may contain record separators.
fn split_csv_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                // Skip blank lines between records
                if !fields.is_empty() || !current.is_empty() {
                    fields.push(std::mem::take(&mut current));
                    records.push(std::mem::take(&mut fields));
                }
            }
            _ => current.push(c),
        }
    }
    if !fields.is_empty() || !current.is_empty() {
        fields.push(current);
        records.push(fields);
    }
    records
}

/// Format seconds as HH:MM:SS.
fn format_timestamp(seconds: f64) -> String {
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeInterval;

    fn utterance(text: &str, speaker: Option<&str>, start: f64, end: f64) -> Utterance {
        Utterance {
            interval: TimeInterval::new(start, end),
            speaker: speaker.map(str::to_string),
            text: text.to_string(),
            original_text: text.to_string(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(65.4), "00:01:05");
        assert_eq!(format_timestamp(3661.0), "01:01:01");
    }

    #[test]
    fn test_unknown_format_name_fails() {
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, PipelineError::UnknownExportFormat(_)));
    }

    #[test]
    fn test_deterministic_filenames() {
        assert_eq!(ExportFormat::Json.filename("meeting"), "meeting_report.json");
        assert_eq!(ExportFormat::Csv.filename("meeting"), "meeting_segments.csv");
        assert_eq!(ExportFormat::Text.filename("meeting"), "meeting_transcript.txt");
        assert_eq!(ExportFormat::Plain.filename("meeting"), "meeting_plain.txt");
    }

    #[test]
    fn test_csv_round_trip() {
        let utterances = vec![
            utterance("hello, \"world\"", Some("SPEAKER_A"), 0.0, 4.0),
            utterance("plain words", None, 6.0, 9.25),
        ];

        let rows = parse_csv(&render_csv(&utterances));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].start, 0.0);
        assert_eq!(rows[0].end, 4.0);
        assert_eq!(rows[0].speaker.as_deref(), Some("SPEAKER_A"));
        assert_eq!(rows[0].text, "hello, \"world\"");
        assert_eq!(rows[1].speaker, None);
        assert_eq!(rows[1].end, 9.25);
        assert_eq!(rows[1].text, "plain words");
    }

    #[test]
    fn test_csv_round_trip_with_embedded_newline() {
        // Raw provider text can carry newlines; the quoted field must
        // survive the round trip instead of being split into broken rows
        let mut first = utterance("cleaned text", Some("SPEAKER_A"), 0.0, 3.0);
        first.original_text = "raw line one\nraw line two".to_string();
        let utterances = vec![first, utterance("second row", None, 3.0, 6.0)];

        let rows = parse_csv(&render_csv(&utterances));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].original_text, "raw line one\nraw line two");
        assert_eq!(rows[0].text, "cleaned text");
        assert_eq!(rows[1].text, "second row");
    }

    #[test]
    fn test_transcript_with_and_without_metadata() {
        let utterances = vec![utterance("hello there", Some("SPEAKER_A"), 0.0, 2.0)];

        let full = render_transcript(&utterances, &TextOptions::default());
        assert!(full.contains("[00:00:00 - 00:00:02] SPEAKER_A: hello there"));

        let bare = render_transcript(
            &utterances,
            &TextOptions {
                timestamps: false,
                speakers: false,
            },
        );
        assert_eq!(bare, "hello there\n");
    }

    #[test]
    fn test_transcript_omits_unset_speaker() {
        let utterances = vec![utterance("who said this", None, 0.0, 1.0)];
        let text = render_transcript(&utterances, &TextOptions::default());
        assert!(text.contains("[00:00:00 - 00:00:01] who said this"));
    }

    #[test]
    fn test_plain_text_skips_blank_utterances() {
        let utterances = vec![
            utterance("first part", Some("A"), 0.0, 1.0),
            utterance("", Some("B"), 1.0, 2.0),
            utterance("second part", Some("A"), 2.0, 3.0),
        ];
        assert_eq!(render_plain(&utterances), "first part second part");
    }

    #[test]
    fn test_writers_are_deterministic() {
        let utterances = vec![utterance("same input", Some("A"), 0.0, 1.0)];
        assert_eq!(render_csv(&utterances), render_csv(&utterances));
        assert_eq!(render_plain(&utterances), render_plain(&utterances));
    }
}
