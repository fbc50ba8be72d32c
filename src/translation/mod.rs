//! Budgeted translation of segment text through a pluggable translator.

mod backend;
mod budget;
mod prompt;
mod remote_api;
mod requester;

pub use backend::{TranslationRequest, Translator, TranslatorError, TranslatorReply};
pub use budget::{char_budget, DEFAULT_SPEECH_RATE};
pub use prompt::{build_instruction, StyleContract};
pub use remote_api::{
    build_body, parse_reply, ApiFlavor, RemoteTranslationConfig, RemoteTranslator,
};
pub use requester::{
    FallbackPolicy, FillerSet, TranslationOutcome, TranslationRequester, DEFAULT_FILLER_WORDS,
    ERROR_TAG, PLACEHOLDER,
};
