//! HTTP translator backend (plain JSON, OpenAI-compatible chat, Anthropic messages).

use super::backend::{TranslationRequest, Translator, TranslatorError, TranslatorReply};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Wire format spoken by the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// `{instruction_text, max_output_chars, temperature}` → `{text}` | `{error}`
    Plain,
    /// OpenAI-compatible `/chat/completions`.
    #[default]
    OpenAi,
    /// Anthropic `/v1/messages`.
    Anthropic,
}

impl ApiFlavor {
    pub fn default_endpoint(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            Self::Anthropic => Some("https://api.anthropic.com/v1/messages"),
        }
    }
}

impl FromStr for ApiFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(format!(
                "Unknown translator flavor: {}. Available: plain, openai, anthropic",
                other
            )),
        }
    }
}

impl fmt::Display for ApiFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain => "plain",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        })
    }
}

/// Configuration for the remote translation API.
#[derive(Debug, Clone)]
pub struct RemoteTranslationConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub flavor: ApiFlavor,
    /// Token ceiling for chat-style flavors; the character budget is separate.
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl RemoteTranslationConfig {
    pub fn new(endpoint: String, model: String, api_key: Option<String>, flavor: ApiFlavor) -> Self {
        Self {
            endpoint: endpoint.trim().to_string(),
            model,
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            flavor,
            max_tokens: 2500,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Translator that POSTs each request to a remote endpoint.
pub struct RemoteTranslator {
    config: RemoteTranslationConfig,
    client: reqwest::Client,
}

impl RemoteTranslator {
    pub fn new(config: RemoteTranslationConfig) -> Result<Self, TranslatorError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Translator for RemoteTranslator {
    fn id(&self) -> &'static str {
        match self.config.flavor {
            ApiFlavor::Plain => "remote-plain",
            ApiFlavor::OpenAi => "remote-openai",
            ApiFlavor::Anthropic => "remote-anthropic",
        }
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslatorReply, TranslatorError> {
        let body = build_body(
            self.config.flavor,
            &self.config.model,
            self.config.max_tokens,
            request,
        );

        let mut req = self.client.post(&self.config.endpoint).json(&body);
        if self.config.flavor == ApiFlavor::Anthropic {
            req = req.header("anthropic-version", ANTHROPIC_VERSION);
        }
        if let Some(ref key) = self.config.api_key {
            req = match self.config.flavor {
                ApiFlavor::Anthropic => req.header("x-api-key", key),
                _ => req.bearer_auth(key),
            };
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::Status { status, body });
        }

        let json: Value = response.json().await?;
        parse_reply(self.config.flavor, &json)
    }
}

/// Request body for the given flavor.
pub fn build_body(
    flavor: ApiFlavor,
    model: &str,
    max_tokens: u32,
    request: &TranslationRequest,
) -> Value {
    match flavor {
        ApiFlavor::Plain => json!(request),
        ApiFlavor::OpenAi => json!({
            "model": model,
            "messages": [{ "role": "user", "content": request.instruction_text }],
            "temperature": request.temperature,
            "max_tokens": max_tokens,
        }),
        ApiFlavor::Anthropic => json!({
            "model": model,
            "messages": [{ "role": "user", "content": request.instruction_text }],
            "temperature": request.temperature,
            "max_tokens": max_tokens,
        }),
    }
}

/// Interpret a successful HTTP reply body.
///
/// A top-level `error` is a service-reported error for every flavor. Anything
/// that carries neither an error nor text where the flavor puts it is an
/// unexpected shape.
pub fn parse_reply(flavor: ApiFlavor, json: &Value) -> Result<TranslatorReply, TranslatorError> {
    if let Some(err) = json.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| err.as_str())
            .map(String::from)
            .unwrap_or_else(|| err.to_string());
        return Ok(TranslatorReply::Error { error: message });
    }

    let text = match flavor {
        ApiFlavor::Plain => json.get("text"),
        ApiFlavor::OpenAi => json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content")),
        ApiFlavor::Anthropic => json
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|b| b.get("text")),
    };

    match text.and_then(|t| t.as_str()) {
        Some(t) => Ok(TranslatorReply::Text {
            text: t.to_string(),
        }),
        None => Err(TranslatorError::UnexpectedShape(json.to_string())),
    }
}
