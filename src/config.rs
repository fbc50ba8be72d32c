//! Pipeline configuration loaded from a JSON settings file and the environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | DUBSCRIBE_CONFIDENCE_THRESHOLD | 0.25 | Spoken words below this confidence are dropped. |
//! | DUBSCRIBE_SPEECH_RATE | 5.68 | Target-language characters per second of audio. |
//! | DUBSCRIBE_DO_NOT_TRANSLATE | Cognizant | Comma-separated proper nouns kept verbatim. |
//! | DUBSCRIBE_FILLER_WORDS | um,uh,so,well,you know,i mean | Comma-separated filler utterances. |
//! | DUBSCRIBE_CONCURRENCY | 1 | Translation requests in flight. |
//! | DUBSCRIBE_TRANSLATOR_URL | per flavor | Translator endpoint. |
//! | DUBSCRIBE_TRANSLATOR_MODEL | (none) | Model name for chat flavors. |
//! | DUBSCRIBE_TRANSLATOR_FLAVOR | openai | plain \| openai \| anthropic |
//! | DUBSCRIBE_API_KEY | (none) | Translator API key. |

use crate::error::{PipelineError, PipelineResult};
use crate::paths;
use crate::transcript::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::translation::{
    ApiFlavor, FallbackPolicy, FillerSet, RemoteTranslationConfig, StyleContract,
    DEFAULT_FILLER_WORDS, DEFAULT_SPEECH_RATE, PLACEHOLDER,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub confidence_threshold: f64,
    /// Characters per second of speech in the target language.
    pub speech_rate: f64,
    pub do_not_translate: Vec<String>,
    pub filler_words: Vec<String>,
    pub placeholder: String,
    pub source_language: String,
    pub target_language: String,
    pub register: String,
    pub concurrency: usize,
    /// Whole-run limit; exceeding it aborts with no output.
    pub timeout_secs: Option<u64>,
    pub translator: TranslatorSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let style = StyleContract::default();
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            speech_rate: DEFAULT_SPEECH_RATE,
            do_not_translate: style.do_not_translate,
            filler_words: DEFAULT_FILLER_WORDS.iter().map(|w| w.to_string()).collect(),
            placeholder: PLACEHOLDER.to_string(),
            source_language: style.source_language,
            target_language: style.target_language,
            register: style.register,
            concurrency: 1,
            timeout_secs: None,
            translator: TranslatorSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSettings {
    pub flavor: ApiFlavor,
    /// Full endpoint URL; falls back to the flavor's public endpoint.
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            flavor: ApiFlavor::default(),
            endpoint: None,
            model: String::new(),
            api_key: None,
            max_tokens: 2500,
            request_timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// Load settings: explicit path, else the user settings file if present,
    /// else defaults. Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = paths::settings_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        debug!("[config] loading {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Apply overrides from an environment lookup. Invalid values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("DUBSCRIBE_CONFIDENCE_THRESHOLD") {
            match v.parse() {
                Ok(t) => self.confidence_threshold = t,
                Err(_) => warn!("[config] ignoring DUBSCRIBE_CONFIDENCE_THRESHOLD={:?}", v),
            }
        }
        if let Some(v) = get("DUBSCRIBE_SPEECH_RATE") {
            match v.parse() {
                Ok(r) => self.speech_rate = r,
                Err(_) => warn!("[config] ignoring DUBSCRIBE_SPEECH_RATE={:?}", v),
            }
        }
        if let Some(v) = get("DUBSCRIBE_DO_NOT_TRANSLATE") {
            self.do_not_translate = split_list(&v);
        }
        if let Some(v) = get("DUBSCRIBE_FILLER_WORDS") {
            self.filler_words = split_list(&v);
        }
        if let Some(v) = get("DUBSCRIBE_CONCURRENCY") {
            match v.parse() {
                Ok(n) => self.concurrency = n,
                Err(_) => warn!("[config] ignoring DUBSCRIBE_CONCURRENCY={:?}", v),
            }
        }
        if let Some(v) = get("DUBSCRIBE_TRANSLATOR_URL") {
            self.translator.endpoint = Some(v);
        }
        if let Some(v) = get("DUBSCRIBE_TRANSLATOR_MODEL") {
            self.translator.model = v;
        }
        if let Some(v) = get("DUBSCRIBE_TRANSLATOR_FLAVOR") {
            match v.parse() {
                Ok(f) => self.translator.flavor = f,
                Err(e) => warn!("[config] ignoring DUBSCRIBE_TRANSLATOR_FLAVOR: {}", e),
            }
        }
        if let Some(v) = get("DUBSCRIBE_API_KEY") {
            self.translator.api_key = Some(v);
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !self.speech_rate.is_finite() || self.speech_rate <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "speech_rate must be a positive number, got {}",
                self.speech_rate
            )));
        }
        if self.concurrency == 0 {
            return Err(PipelineError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.placeholder.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "placeholder must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn style_contract(&self) -> StyleContract {
        StyleContract {
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            register: self.register.clone(),
            do_not_translate: self.do_not_translate.clone(),
        }
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy {
            placeholder: self.placeholder.clone(),
            fillers: FillerSet::new(&self.filler_words),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Settings for [`crate::translation::RemoteTranslator`].
    pub fn remote_config(&self) -> PipelineResult<RemoteTranslationConfig> {
        let t = &self.translator;
        let endpoint = t
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| t.flavor.default_endpoint().map(String::from))
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!(
                    "translator endpoint is required for the {} flavor",
                    t.flavor
                ))
            })?;
        if t.flavor != ApiFlavor::Plain && t.model.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(format!(
                "translator model is required for the {} flavor",
                t.flavor
            )));
        }
        let mut config =
            RemoteTranslationConfig::new(endpoint, t.model.clone(), t.api_key.clone(), t.flavor);
        config.max_tokens = t.max_tokens;
        config.timeout = Duration::from_secs(t.request_timeout_secs.max(1));
        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
