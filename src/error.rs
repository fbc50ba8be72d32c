//! Crate-wide error type for fatal pipeline failures.
//!
//! Per-segment translation problems never show up here; they are resolved
//! in-band by the translation requester.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transcript has no `results` object")]
    MissingResults,

    #[error("transcript has neither `results.items` nor `results.audio_segments`")]
    NoSegmentSource,

    #[error("transcript has `results.audio_segments` but no `results.items` to resolve them")]
    MissingItems,

    #[error("item {id} is malformed: {reason}")]
    MalformedItem { id: i64, reason: String },

    #[error("audio segment {index} is malformed: {reason}")]
    MalformedSegment { index: usize, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("pipeline timed out after {secs}s")]
    TimedOut { secs: u64 },

    #[error("translator setup failed: {0}")]
    TranslatorSetup(String),
}

impl PipelineError {
    /// Stable machine-readable code for each variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "DS-IO",
            Self::Json(_) => "DS-JSON",
            Self::MissingResults => "DS-INPUT-NO-RESULTS",
            Self::NoSegmentSource => "DS-INPUT-NO-SEGMENTS",
            Self::MissingItems => "DS-INPUT-NO-ITEMS",
            Self::MalformedItem { .. } => "DS-INPUT-ITEM",
            Self::MalformedSegment { .. } => "DS-INPUT-SEGMENT",
            Self::InvalidConfig(_) => "DS-CONFIG",
            Self::TimedOut { .. } => "DS-TIMEOUT",
            Self::TranslatorSetup(_) => "DS-TRANSLATOR",
        }
    }

    /// True for errors caused by the input artifact itself.
    #[must_use]
    pub const fn is_input_malformation(&self) -> bool {
        matches!(
            self,
            Self::Json(_)
                | Self::MissingResults
                | Self::NoSegmentSource
                | Self::MissingItems
                | Self::MalformedItem { .. }
                | Self::MalformedSegment { .. }
        )
    }
}
