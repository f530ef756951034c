use crate::models::{RecognizedSpan, SpeakerTurn, Utterance};

/// Assign a speaker to each recognized span by maximum overlap with the
/// diarization turns.
///
/// Produces exactly one utterance per span, in span order. A span with no
/// positively overlapping turn gets `speaker: None`; that is data, not an
/// error. Ties on overlap go to the first turn in the supplied order, so
/// callers must pass turns in a stable order (the pipeline sorts them by
/// start time) for the result to be deterministic.
///
/// O(spans x turns). Both sets are bounded by conversation length rather
/// than audio duration, so no interval-tree indexing; for very long
/// recordings this loop is the scaling bottleneck.
pub fn align_spans(spans: &[RecognizedSpan], turns: &[SpeakerTurn]) -> Vec<Utterance> {
    spans
        .iter()
        .map(|span| Utterance {
            interval: span.interval,
            speaker: best_speaker(span, turns),
            text: span.text.clone(),
            original_text: span.text.clone(),
        })
        .collect()
}

/// Find the speaker of the turn with maximum positive overlap, if any.
fn best_speaker(span: &RecognizedSpan, turns: &[SpeakerTurn]) -> Option<String> {
    let mut max_overlap = 0.0;
    let mut matched: Option<&str> = None;

    for turn in turns {
        let overlap = span.interval.overlap(&turn.interval);
        if overlap > max_overlap {
            max_overlap = overlap;
            matched = Some(&turn.speaker);
        }
    }

    matched.map(str::to_string)
}
