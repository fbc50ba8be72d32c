//! Segment reconstruction: rebuilds segment transcripts from surviving items.

use super::filter::low_confidence_ids;
use super::model::{AudioSegment, RecognizedItem, Transcript};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Rebuild each segment from the items that survived filtering.
///
/// Ids in `excluded` and ids with no matching item are removed. The transcript
/// becomes the retained items' content joined by single spaces. Segments left
/// with a blank transcript are dropped; the rest keep their relative order.
pub fn reconstruct_segments(
    segments: &[AudioSegment],
    items: &[RecognizedItem],
    excluded: &HashSet<i64>,
) -> Vec<AudioSegment> {
    // First occurrence wins for duplicate ids.
    let mut by_id: HashMap<i64, &RecognizedItem> = HashMap::with_capacity(items.len());
    for item in items {
        by_id.entry(item.id).or_insert(item);
    }

    segments
        .iter()
        .enumerate()
        .filter_map(|(idx, seg)| {
            let retained: Vec<&RecognizedItem> = seg
                .item_ids
                .iter()
                .filter(|id| !excluded.contains(*id))
                .filter_map(|id| {
                    let found = by_id.get(id).copied();
                    if found.is_none() {
                        debug!("[reconstruct] segment {}: skipping dangling item id {}", idx, id);
                    }
                    found
                })
                .collect();

            let transcript = retained
                .iter()
                .map(|i| i.content.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            if transcript.trim().is_empty() {
                debug!("[reconstruct] segment {}: empty after filtering, dropped", idx);
                return None;
            }

            Some(AudioSegment {
                item_ids: retained.iter().map(|i| i.id).collect(),
                start_time: seg.start_time,
                end_time: seg.end_time,
                transcript,
            })
        })
        .collect()
}

/// Build one-word segments straight from items, for transcripts without
/// `audio_segments`.
///
/// Every timed item opens a segment spanning its own times. Untimed items
/// (punctuation) join the preceding segment; leading untimed items are dropped.
/// Transcripts are left empty; run the result through [`reconstruct_segments`].
pub fn pseudo_segments(items: &[RecognizedItem]) -> Vec<AudioSegment> {
    let mut segments: Vec<AudioSegment> = Vec::new();
    for item in items {
        match item.timing() {
            Some((start_time, end_time)) => segments.push(AudioSegment {
                item_ids: vec![item.id],
                start_time,
                end_time,
                transcript: String::new(),
            }),
            None => {
                if let Some(last) = segments.last_mut() {
                    last.item_ids.push(item.id);
                }
            }
        }
    }
    segments
}

/// Filter + reconstruction in one step. Falls back to [`pseudo_segments`]
/// when the transcript has no segments.
pub fn clean_segments(transcript: &Transcript, threshold: f64) -> Vec<AudioSegment> {
    let excluded = low_confidence_ids(&transcript.items, threshold);
    debug!(
        "[filter] {} of {} items below confidence {}",
        excluded.len(),
        transcript.items.len(),
        threshold
    );

    match transcript.segments {
        Some(ref segments) => reconstruct_segments(segments, &transcript.items, &excluded),
        None => {
            warn!("[filter] no audio_segments in transcript, using word-level items as segments");
            let pseudo = pseudo_segments(&transcript.items);
            reconstruct_segments(&pseudo, &transcript.items, &excluded)
        }
    }
}

/// Cleaned copy of the whole transcript. Items are kept as-is; segments are
/// replaced by their reconstruction. Applying this twice changes nothing.
pub fn clean_transcript(transcript: &Transcript, threshold: f64) -> Transcript {
    Transcript {
        items: transcript.items.clone(),
        segments: Some(clean_segments(transcript, threshold)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::model::ItemKind;

    fn word(id: i64, content: &str, confidence: f64) -> RecognizedItem {
        RecognizedItem {
            id,
            kind: ItemKind::Pronunciation,
            content: content.to_string(),
            confidence: Some(confidence),
            start_time: Some(id as f64),
            end_time: Some(id as f64 + 0.5),
        }
    }

    fn punct(id: i64, content: &str) -> RecognizedItem {
        RecognizedItem {
            id,
            kind: ItemKind::Punctuation,
            content: content.to_string(),
            confidence: Some(0.0),
            start_time: None,
            end_time: None,
        }
    }

    fn segment(ids: &[i64], start: f64, end: f64) -> AudioSegment {
        AudioSegment {
            item_ids: ids.to_vec(),
            start_time: start,
            end_time: end,
            transcript: "stale".to_string(),
        }
    }

    #[test]
    fn rebuilds_transcript_from_survivors() {
        let items = vec![word(1, "Hello", 0.9), word(2, "ignored", 0.1), punct(3, ".")];
        let segs = vec![segment(&[1, 2, 3], 0.0, 2.0)];
        let excluded = HashSet::from([2]);
        let out = reconstruct_segments(&segs, &items, &excluded);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].item_ids, vec![1, 3]);
        assert_eq!(out[0].transcript, "Hello .");
        assert_eq!(out[0].start_time, 0.0);
        assert_eq!(out[0].end_time, 2.0);
    }

    #[test]
    fn drops_segments_that_become_empty() {
        let items = vec![word(1, "uh", 0.1), word(2, "Yes", 0.9)];
        let segs = vec![segment(&[1], 0.0, 1.0), segment(&[2], 1.0, 2.0)];
        let out = reconstruct_segments(&segs, &items, &HashSet::from([1]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].transcript, "Yes");
    }

    #[test]
    fn whitespace_only_content_counts_as_empty() {
        let items = vec![word(1, "  ", 0.9)];
        let out = reconstruct_segments(&[segment(&[1], 0.0, 1.0)], &items, &HashSet::new());
        assert!(out.is_empty());
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let items = vec![word(1, "Hi", 0.9)];
        let out = reconstruct_segments(&[segment(&[42, 1, 43], 0.0, 1.0)], &items, &HashSet::new());
        assert_eq!(out[0].item_ids, vec![1]);
        assert_eq!(out[0].transcript, "Hi");
    }

    #[test]
    fn duplicate_ids_resolve_to_first_item() {
        let items = vec![word(1, "first", 0.9), word(1, "second", 0.9)];
        let out = reconstruct_segments(&[segment(&[1], 0.0, 1.0)], &items, &HashSet::new());
        assert_eq!(out[0].transcript, "first");
    }

    #[test]
    fn preserves_relative_order() {
        let items = vec![word(1, "a", 0.9), word(2, "b", 0.1), word(3, "c", 0.9)];
        let segs = vec![
            segment(&[3], 4.0, 5.0),
            segment(&[2], 2.0, 3.0),
            segment(&[1], 0.0, 1.0),
        ];
        let out = reconstruct_segments(&segs, &items, &HashSet::from([2]));
        let texts: Vec<_> = out.iter().map(|s| s.transcript.as_str()).collect();
        assert_eq!(texts, vec!["c", "a"]);
    }

    #[test]
    fn pseudo_segments_attach_punctuation_to_previous_word() {
        let items = vec![punct(0, "-"), word(1, "Hi", 0.9), punct(2, ","), word(3, "there", 0.9)];
        let pseudo = pseudo_segments(&items);
        assert_eq!(pseudo.len(), 2);
        assert_eq!(pseudo[0].item_ids, vec![1, 2]);
        assert_eq!(pseudo[0].start_time, 1.0);
        assert_eq!(pseudo[0].end_time, 1.5);
        assert_eq!(pseudo[1].item_ids, vec![3]);
    }

    #[test]
    fn degraded_mode_filters_like_normal_segments() {
        let transcript = Transcript {
            items: vec![word(1, "Hi", 0.9), punct(2, ","), word(3, "mumble", 0.05)],
            segments: None,
        };
        let out = clean_segments(&transcript, 0.25);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].transcript, "Hi ,");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let transcript = Transcript {
            items: vec![word(1, "Hello", 0.9), word(2, "ignored", 0.1), word(3, "Goodbye", 0.9)],
            segments: Some(vec![segment(&[1, 2], 0.0, 2.0), segment(&[3], 2.0, 4.0)]),
        };
        let once = clean_transcript(&transcript, 0.25);
        let twice = clean_transcript(&once, 0.25);
        assert_eq!(once, twice);
    }

    #[test]
    fn cleaning_already_clean_transcript_is_noop() {
        let transcript = Transcript {
            items: vec![word(1, "Hello", 0.9), word(2, "world", 0.8)],
            segments: Some(vec![AudioSegment {
                item_ids: vec![1, 2],
                start_time: 0.0,
                end_time: 1.0,
                transcript: "Hello world".to_string(),
            }]),
        };
        assert_eq!(clean_transcript(&transcript, 0.25), transcript);
    }
}
