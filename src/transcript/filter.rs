//! Confidence filter: marks low-confidence spoken words for exclusion.

use super::model::{ItemKind, RecognizedItem};
use std::collections::HashSet;

/// Default minimum confidence a spoken word needs to survive.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.25;

/// Ids of pronunciation items whose confidence is strictly below `threshold`.
/// Punctuation and other kinds are never excluded.
pub fn low_confidence_ids(items: &[RecognizedItem], threshold: f64) -> HashSet<i64> {
    items
        .iter()
        .filter(|item| item.kind == ItemKind::Pronunciation)
        .filter(|item| item.effective_confidence() < threshold)
        .map(|item| item.id)
        .collect()
}
