//! Sends one translation request per segment and resolves the outcome into
//! subtitle text.

use super::backend::{TranslationRequest, Translator, TranslatorReply};
use super::prompt::{build_instruction, StyleContract};
use log::{debug, warn};
use std::collections::HashSet;

/// Visually blank, non-empty stand-in for intentionally empty output.
pub const PLACEHOLDER: &str = "\u{3000}";

/// Prefix marking a segment whose translation failed.
pub const ERROR_TAG: &str = "[TRANSLATION_ERROR]";

pub const DEFAULT_FILLER_WORDS: &[&str] = &["um", "uh", "so", "well", "you know", "i mean"];

/// What came back from the translator for one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// Non-empty text, already trimmed.
    Translated(String),
    /// The service answered with nothing (filler-only input).
    Empty,
    /// Transport error, service error, or unreadable reply.
    Failed(String),
}

/// Case-insensitive set of filler utterances.
#[derive(Debug, Clone, PartialEq)]
pub struct FillerSet {
    words: HashSet<String>,
}

impl FillerSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| normalize_filler(w.as_ref()))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// True when the whole text is one filler, allowing a trailing comma.
    pub fn matches(&self, text: &str) -> bool {
        self.words.contains(&normalize_filler(text))
    }
}

impl Default for FillerSet {
    fn default() -> Self {
        Self::new(DEFAULT_FILLER_WORDS)
    }
}

fn normalize_filler(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    lower
        .strip_suffix(',')
        .unwrap_or(lower.as_str())
        .trim_end()
        .to_string()
}

/// Decision table turning an outcome into subtitle text.
///
/// | outcome            | source is filler | result                 |
/// |--------------------|------------------|------------------------|
/// | `Translated(t)`    | any              | `t`                    |
/// | `Empty`            | any              | placeholder            |
/// | `Failed(_)`        | yes              | placeholder            |
/// | `Failed(_)`        | no               | `[TRANSLATION_ERROR] …`|
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    pub placeholder: String,
    pub fillers: FillerSet,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER.to_string(),
            fillers: FillerSet::default(),
        }
    }
}

impl FallbackPolicy {
    pub fn resolve(&self, outcome: &TranslationOutcome, source_text: &str) -> String {
        match outcome {
            TranslationOutcome::Translated(text) => text.clone(),
            TranslationOutcome::Empty => self.placeholder.clone(),
            TranslationOutcome::Failed(_) if self.fillers.matches(source_text) => {
                self.placeholder.clone()
            }
            TranslationOutcome::Failed(_) => format!("{} {}", ERROR_TAG, source_text),
        }
    }
}

/// Formats requests for a [`Translator`] and interprets its replies.
///
/// The budget goes out as an instruction and as `max_output_chars`; replies
/// longer than the budget are accepted unchanged.
pub struct TranslationRequester<'a> {
    translator: &'a dyn Translator,
    style: StyleContract,
    policy: FallbackPolicy,
}

impl<'a> TranslationRequester<'a> {
    pub fn new(translator: &'a dyn Translator, style: StyleContract, policy: FallbackPolicy) -> Self {
        Self {
            translator,
            style,
            policy,
        }
    }

    /// One request, one outcome. No retries.
    pub async fn request(&self, source_text: &str, budget: u32) -> TranslationOutcome {
        let instruction = build_instruction(source_text, budget, &self.style);
        let request = TranslationRequest::new(instruction, budget);
        debug!(
            "[translate] backend={} budget={} source={:?}",
            self.translator.id(),
            budget,
            source_text.chars().take(80).collect::<String>()
        );

        match self.translator.translate(&request).await {
            Ok(TranslatorReply::Text { text }) => {
                let text = text.trim();
                if text.is_empty() {
                    TranslationOutcome::Empty
                } else {
                    if text.chars().count() > budget as usize {
                        debug!(
                            "[translate] reply exceeds budget ({} > {}), kept as-is",
                            text.chars().count(),
                            budget
                        );
                    }
                    TranslationOutcome::Translated(text.to_string())
                }
            }
            Ok(TranslatorReply::Error { error }) => {
                warn!("[translate] service reported error: {}", error);
                TranslationOutcome::Failed(error)
            }
            Err(e) => {
                warn!("[translate] request failed for {:?}: {}", source_text, e);
                TranslationOutcome::Failed(e.to_string())
            }
        }
    }

    /// Request and resolve straight to subtitle text.
    pub async fn translate_text(&self, source_text: &str, budget: u32) -> String {
        let outcome = self.request(source_text, budget).await;
        self.policy.resolve(&outcome, source_text)
    }
}
