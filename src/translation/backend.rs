//! Translator trait and the request/reply types at the service boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One translation request, as sent to the external service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub instruction_text: String,
    pub max_output_chars: u32,
    pub temperature: f32,
}

impl TranslationRequest {
    pub fn new(instruction_text: String, max_output_chars: u32) -> Self {
        Self {
            instruction_text,
            max_output_chars,
            temperature: 0.0,
        }
    }
}

/// Well-formed reply from the service: either text or a reported error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslatorReply {
    Text { text: String },
    Error { error: String },
}

/// Transport-level failure or a reply that could not be interpreted.
#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("{0}")]
    Other(String),
}

/// Trait for translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    fn id(&self) -> &'static str;
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslatorReply, TranslatorError>;
}
