use std::collections::{BTreeMap, BTreeSet};

use crate::entities::EntityAnalysis;
use crate::models::{
    Keyword, Report, ReportMetadata, ReportStatistics, SpeakerTurn, StageTiming, Utterance,
};

/// Merge the enriched utterance sequence with keywords, speaker statistics
/// and entity findings into the canonical report.
///
/// Derived statistics are computed from the utterance sequence only, so the
/// report always reflects post-alignment, post-cleaning state rather than
/// raw collaborator output.
pub fn assemble_report(
    metadata: ReportMetadata,
    utterances: Vec<Utterance>,
    keywords: Vec<Keyword>,
    turns: &[SpeakerTurn],
    entities: EntityAnalysis,
    stage_timings: Vec<StageTiming>,
) -> Report {
    Report {
        metadata,
        statistics: derive_statistics(&utterances),
        keywords,
        speaker_time: speaker_time_share(turns),
        entities,
        utterances,
        stage_timings,
    }
}

/// Statistics derived deterministically from the utterance sequence.
fn derive_statistics(utterances: &[Utterance]) -> ReportStatistics {
    let total_words = utterances.iter().map(Utterance::word_count).sum();
    let total_duration_secs = utterances
        .iter()
        .map(|u| u.interval.end)
        .fold(0.0_f64, f64::max);
    let speakers: BTreeSet<&str> = utterances
        .iter()
        .filter_map(|u| u.speaker.as_deref())
        .collect();

    ReportStatistics {
        total_utterances: utterances.len(),
        total_words,
        total_duration_secs,
        speakers: speakers.into_iter().map(str::to_string).collect(),
    }
}

/// Cumulative speaking time per speaker, summed over the diarization turns.
pub fn speaker_time_share(turns: &[SpeakerTurn]) -> BTreeMap<String, f64> {
    let mut share = BTreeMap::new();
    for turn in turns {
        *share.entry(turn.speaker.clone()).or_insert(0.0) += turn.interval.duration();
    }
    share
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

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            run_id: "test".to_string(),
            source: "conversation.mp4".into(),
            language: "en".to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            processing_secs: 1.0,
            audio_duration_secs: 10.0,
        }
    }

    #[test]
    fn test_statistics_from_utterances() {
        let utterances = vec![
            utterance("hello there", Some("SPEAKER_B"), 0.0, 2.0),
            utterance("general remark", Some("SPEAKER_A"), 2.0, 5.5),
            utterance("unattributed", None, 5.5, 6.0),
        ];

        let report = assemble_report(
            metadata(),
            utterances,
            vec![],
            &[],
            EntityAnalysis::empty(),
            vec![],
        );

        assert_eq!(report.statistics.total_utterances, 3);
        assert_eq!(report.statistics.total_words, 5);
        assert_eq!(report.statistics.total_duration_secs, 6.0);
        // Sorted unique labels; None excluded
        assert_eq!(report.statistics.speakers, vec!["SPEAKER_A", "SPEAKER_B"]);
    }

    #[test]
    fn test_speaker_time_share_sums_turns() {
        let turns = vec![
            SpeakerTurn::new("SPEAKER_A", 0.0, 5.0),
            SpeakerTurn::new("SPEAKER_B", 5.0, 10.0),
            SpeakerTurn::new("SPEAKER_A", 10.0, 12.5),
        ];

        let share = speaker_time_share(&turns);
        assert_eq!(share["SPEAKER_A"], 7.5);
        assert_eq!(share["SPEAKER_B"], 5.0);
    }

    #[test]
    fn test_empty_input_produces_degenerate_report() {
        let report = assemble_report(
            metadata(),
            vec![],
            vec![],
            &[],
            EntityAnalysis::empty(),
            vec![],
        );

        assert_eq!(report.statistics.total_utterances, 0);
        assert_eq!(report.statistics.total_words, 0);
        assert_eq!(report.statistics.total_duration_secs, 0.0);
        assert!(report.statistics.speakers.is_empty());
        assert!(report.speaker_time.is_empty());
    }
}
