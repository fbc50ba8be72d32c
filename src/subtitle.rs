//! Subtitle records and their assembly from translated segments.

use crate::transcript::AudioSegment;
use serde::{Deserialize, Serialize};

/// One output subtitle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub start_time: f64,
    pub end_time: f64,
    #[serde(rename = "text")]
    pub source_text: String,
    #[serde(rename = "ja_text")]
    pub target_text: String,
}

impl Subtitle {
    pub fn start_ms(&self) -> u64 {
        secs_to_ms(self.start_time)
    }

    pub fn end_ms(&self) -> u64 {
        secs_to_ms(self.end_time)
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

/// Collects subtitles in segment order.
#[derive(Debug, Default)]
pub struct SubtitleAssembler {
    subtitles: Vec<Subtitle>,
}

impl SubtitleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subtitles: Vec::with_capacity(capacity),
        }
    }

    /// Append the subtitle for `segment`. Call in segment order.
    pub fn push(&mut self, segment: &AudioSegment, target_text: String) {
        self.subtitles.push(Subtitle {
            start_time: segment.start_time,
            end_time: segment.end_time,
            source_text: segment.transcript.clone(),
            target_text,
        });
    }

    pub fn finish(self) -> Vec<Subtitle> {
        self.subtitles
    }
}
