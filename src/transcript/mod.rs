//! Transcript ingestion and cleaning.

mod filter;
mod model;
mod reconstruct;

pub use filter::{low_confidence_ids, DEFAULT_CONFIDENCE_THRESHOLD};
pub use model::{AudioSegment, ItemKind, RecognizedItem, Transcript, TranscriptDocument};
pub use reconstruct::{clean_segments, clean_transcript, pseudo_segments, reconstruct_segments};
