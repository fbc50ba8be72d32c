//! Recognized items, audio segments, and ingestion of the raw transcript artifact.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Kind of a recognized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Pronunciation,
    Punctuation,
    #[serde(other)]
    Other,
}

/// A single recognized token (word or punctuation) with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub content: String,
    /// `None` when the recognizer omitted the score; treated as full confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

impl RecognizedItem {
    pub fn effective_confidence(&self) -> f64 {
        self.confidence.unwrap_or(1.0)
    }

    /// Start and end time, when the recognizer aligned this item to audio.
    pub fn timing(&self) -> Option<(f64, f64)> {
        Some((self.start_time?, self.end_time?))
    }
}

/// A time-bounded group of items forming one spoken phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSegment {
    #[serde(rename = "items")]
    pub item_ids: Vec<i64>,
    pub start_time: f64,
    pub end_time: f64,
    pub transcript: String,
}

impl AudioSegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Validated transcript: items plus segments (absent in degraded inputs).
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub items: Vec<RecognizedItem>,
    pub segments: Option<Vec<AudioSegment>>,
}

impl Transcript {
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        let doc: TranscriptDocument = serde_json::from_str(json)?;
        doc.into_transcript()
    }

    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Render back into the `{"results": {...}}` envelope the ingester accepts.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut results = serde_json::Map::new();
        results.insert("items".into(), serde_json::json!(self.items));
        if let Some(ref segments) = self.segments {
            results.insert("audio_segments".into(), serde_json::json!(segments));
        }
        serde_json::json!({ "results": results })
    }
}

/// Raw transcript artifact as produced by the recognizer.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptDocument {
    #[serde(default)]
    results: Option<RawResults>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawResults {
    #[serde(default)]
    items: Option<Vec<RawItem>>,
    #[serde(default)]
    audio_segments: Option<Vec<RawSegment>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawItem {
    id: i64,
    #[serde(rename = "type")]
    kind: ItemKind,
    #[serde(default)]
    alternatives: Vec<RawAlternative>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, deserialize_with = "de_flex_f64")]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "de_flex_f64")]
    start_time: Option<f64>,
    #[serde(default, deserialize_with = "de_flex_f64")]
    end_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAlternative {
    #[serde(default)]
    content: Option<String>,
    #[serde(default, deserialize_with = "de_flex_f64")]
    confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSegment {
    #[serde(default)]
    items: Vec<i64>,
    #[serde(default, deserialize_with = "de_flex_f64")]
    start_time: Option<f64>,
    #[serde(default, deserialize_with = "de_flex_f64")]
    end_time: Option<f64>,
    #[serde(default)]
    transcript: String,
}

/// Recognizers emit numbers either as JSON numbers or as decimal strings.
fn de_flex_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flex {
        Num(f64),
        Text(String),
    }

    Ok(match Option::<Flex>::deserialize(deserializer)? {
        Some(Flex::Num(n)) => Some(n),
        Some(Flex::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    }
    .filter(|n| n.is_finite()))
}

impl TranscriptDocument {
    /// Validate once and convert into typed records.
    pub fn into_transcript(self) -> PipelineResult<Transcript> {
        let results = self.results.ok_or(PipelineError::MissingResults)?;
        let (raw_items, raw_segments) = match (results.items, results.audio_segments) {
            (None, None) => return Err(PipelineError::NoSegmentSource),
            (None, Some(_)) => return Err(PipelineError::MissingItems),
            (Some(items), segments) => (items, segments),
        };

        let items = raw_items
            .into_iter()
            .map(RawItem::into_item)
            .collect::<PipelineResult<Vec<_>>>()?;

        let segments = raw_segments
            .map(|segs| {
                segs.into_iter()
                    .enumerate()
                    .map(|(index, s)| s.into_segment(index))
                    .collect::<PipelineResult<Vec<_>>>()
            })
            .transpose()?;

        Ok(Transcript { items, segments })
    }
}

impl RawSegment {
    /// A missing start is 0.0; a missing end collapses onto the start.
    fn into_segment(self, index: usize) -> PipelineResult<AudioSegment> {
        let start_time = self.start_time.unwrap_or(0.0);
        let end_time = self.end_time.unwrap_or(start_time);
        if end_time < start_time {
            return Err(PipelineError::MalformedSegment {
                index,
                reason: format!("end_time {} is before start_time {}", end_time, start_time),
            });
        }
        Ok(AudioSegment {
            item_ids: self.items,
            start_time,
            end_time,
            transcript: self.transcript,
        })
    }
}

impl RawItem {
    fn into_item(self) -> PipelineResult<RecognizedItem> {
        let first = self.alternatives.into_iter().next();
        let (alt_content, alt_confidence) = match first {
            Some(alt) => (alt.content, alt.confidence),
            None => (None, None),
        };
        let content = self
            .content
            .or(alt_content)
            .ok_or_else(|| PipelineError::MalformedItem {
                id: self.id,
                reason: "no content in item or alternatives".to_string(),
            })?;
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(PipelineError::MalformedItem {
                    id: self.id,
                    reason: format!("end_time {} is before start_time {}", end, start),
                });
            }
        }
        Ok(RecognizedItem {
            id: self.id,
            kind: self.kind,
            content,
            confidence: self.confidence.or(alt_confidence),
            start_time: self.start_time,
            end_time: self.end_time,
        })
    }
}
