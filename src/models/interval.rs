use serde::{Deserialize, Serialize};

/// A half-open-ish time range in seconds. Invariant: `0 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl TimeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        debug_assert!(start >= 0.0 && start <= end, "invalid interval {start}..{end}");
        Self { start, end }
    }

    /// Duration in seconds. Zero-duration intervals are valid.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Overlap duration with another interval, clamped at zero.
    pub fn overlap(&self, other: &TimeInterval) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }
}

/// An interval during which diarization attributes audio to one speaker.
/// Immutable once received from the diarization provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerTurn {
    #[serde(flatten)]
    pub interval: TimeInterval,
    /// Opaque speaker label (e.g. "SPEAKER_00")
    pub speaker: String,
}

impl SpeakerTurn {
    pub fn new(speaker: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            speaker: speaker.into(),
        }
    }
}

/// An interval of audio with its recognized text, from the recognition
/// provider. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedSpan {
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub text: String,
}

impl RecognizedSpan {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            text: text.into(),
        }
    }
}

/// The aligned, cleaned unit combining a recognized span with its inferred
/// speaker. Created by the aligner, cleaned by the normalizer, and never
/// mutated after that. Utterances keep the chronological order of the
/// recognized spans they came from; export formats rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    #[serde(flatten)]
    pub interval: TimeInterval,
    /// Inferred speaker label, unset when no turn overlapped the span
    pub speaker: Option<String>,
    /// Cleaned text
    pub text: String,
    /// Text exactly as the recognition provider produced it
    pub original_text: String,
}

impl Utterance {
    /// Word count of the cleaned text by whitespace splitting.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = TimeInterval::new(0.0, 5.0);
        let b = TimeInterval::new(3.0, 8.0);
        assert_eq!(a.overlap(&b), 2.0);
        assert_eq!(b.overlap(&a), 2.0);
    }

    #[test]
    fn test_overlap_disjoint_is_zero() {
        let a = TimeInterval::new(0.0, 1.0);
        let b = TimeInterval::new(2.0, 3.0);
        assert_eq!(a.overlap(&b), 0.0);
    }

    #[test]
    fn test_zero_duration_interval() {
        let point = TimeInterval::new(2.0, 2.0);
        assert_eq!(point.duration(), 0.0);
        // Zero overlap with everything unless exactly coincident
        assert_eq!(point.overlap(&TimeInterval::new(0.0, 5.0)), 0.0);
    }
}
