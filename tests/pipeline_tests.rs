//! End-to-end pipeline tests with a scripted in-memory translator.

use async_trait::async_trait;
use dubscribe::translation::{
    TranslationRequest, Translator, TranslatorError, TranslatorReply, ERROR_TAG, PLACEHOLDER,
};
use dubscribe::{run_pipeline, PipelineConfig, PipelineError, Subtitle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Replies keyed by the source text at the end of the instruction.
#[derive(Default)]
struct ScriptedTranslator {
    replies: HashMap<String, Result<String, String>>,
    delays_ms: HashMap<String, u64>,
    requests: Mutex<Vec<TranslationRequest>>,
}

impl ScriptedTranslator {
    fn reply(mut self, source: &str, text: &str) -> Self {
        self.replies.insert(source.to_string(), Ok(text.to_string()));
        self
    }

    fn fail(mut self, source: &str) -> Self {
        self.replies
            .insert(source.to_string(), Err("service unavailable".to_string()));
        self
    }

    fn delay(mut self, source: &str, ms: u64) -> Self {
        self.delays_ms.insert(source.to_string(), ms);
        self
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn source_of(request: &TranslationRequest) -> String {
    request
        .instruction_text
        .lines()
        .last()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Translator for ScriptedTranslator {
    fn id(&self) -> &'static str {
        "scripted"
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslatorReply, TranslatorError> {
        self.requests.lock().unwrap().push(request.clone());
        let source = source_of(request);
        if let Some(ms) = self.delays_ms.get(&source) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        match self.replies.get(&source) {
            Some(Ok(text)) => Ok(TranslatorReply::Text { text: text.clone() }),
            Some(Err(e)) => Err(TranslatorError::Other(e.clone())),
            None => Ok(TranslatorReply::Error {
                error: format!("no script for {:?}", source),
            }),
        }
    }
}

const HELLO_GOODBYE: &str = r#"{
    "results": {
        "items": [
            {"id": 1, "type": "pronunciation", "start_time": "0.0", "end_time": "0.8",
             "alternatives": [{"confidence": "0.9", "content": "Hello"}]},
            {"id": 2, "type": "pronunciation", "start_time": "0.9", "end_time": "1.8",
             "alternatives": [{"confidence": "0.1", "content": "ignored"}]},
            {"id": 3, "type": "pronunciation", "start_time": "2.0", "end_time": "3.5",
             "alternatives": [{"confidence": "0.9", "content": "Goodbye"}]}
        ],
        "audio_segments": [
            {"id": 0, "transcript": "Hello ignored", "start_time": "0.0", "end_time": "2.0", "items": [1, 2]},
            {"id": 1, "transcript": "Goodbye", "start_time": "2.0", "end_time": "4.0", "items": [3]}
        ]
    }
}"#;

#[tokio::test]
async fn hello_goodbye_scenario() {
    let translator = ScriptedTranslator::default()
        .reply("Hello", "こんにちは")
        .reply("Goodbye", "さようなら");
    let subs = run_pipeline(HELLO_GOODBYE, &PipelineConfig::default(), &translator)
        .await
        .unwrap();

    assert_eq!(
        subs,
        vec![
            Subtitle {
                start_time: 0.0,
                end_time: 2.0,
                source_text: "Hello".into(),
                target_text: "こんにちは".into(),
            },
            Subtitle {
                start_time: 2.0,
                end_time: 4.0,
                source_text: "Goodbye".into(),
                target_text: "さようなら".into(),
            },
        ]
    );

    let requests = translator.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    // floor(2.0 * 5.68) = 11
    assert!(requests.iter().all(|r| r.max_output_chars == 11));
    assert!(requests.iter().all(|r| !r.instruction_text.contains("ignored")));
}

#[tokio::test]
async fn output_artifact_uses_contract_keys() {
    let translator = ScriptedTranslator::default()
        .reply("Hello", "こんにちは")
        .reply("Goodbye", "さようなら");
    let subs = run_pipeline(HELLO_GOODBYE, &PipelineConfig::default(), &translator)
        .await
        .unwrap();

    let mut buf = Vec::new();
    dubscribe::export::write_subtitles(&mut buf, Default::default(), &subs, false).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value[0]["text"], "Hello");
    assert_eq!(value[0]["ja_text"], "こんにちは");
    assert_eq!(value[1]["start_time"], 2.0);
    assert_eq!(value[1]["end_time"], 4.0);
}

#[tokio::test]
async fn failures_resolve_in_band() {
    let json = r#"{"results": {
        "items": [
            {"id": 1, "type": "pronunciation", "content": "um", "confidence": 0.9},
            {"id": 2, "type": "punctuation", "content": ",", "confidence": 0.0},
            {"id": 3, "type": "pronunciation", "content": "Revenue grew", "confidence": 0.95},
            {"id": 4, "type": "pronunciation", "content": "uh", "confidence": 0.8}
        ],
        "audio_segments": [
            {"items": [1, 2], "start_time": 0, "end_time": 1},
            {"items": [3], "start_time": 1, "end_time": 3},
            {"items": [4], "start_time": 3, "end_time": 4}
        ]
    }}"#;
    let translator = ScriptedTranslator::default()
        .fail("um ,")
        .fail("Revenue grew")
        .reply("uh", "");
    let subs = run_pipeline(json, &PipelineConfig::default(), &translator)
        .await
        .unwrap();

    assert_eq!(subs.len(), 3);
    // "um ," still reads as a filler: trailing comma and spacing are ignored.
    assert_eq!(subs[0].source_text, "um ,");
    assert_eq!(subs[0].target_text, PLACEHOLDER);
    assert_eq!(subs[1].target_text, format!("{} Revenue grew", ERROR_TAG));
    assert_eq!(subs[2].target_text, PLACEHOLDER);
}

#[tokio::test]
async fn filler_only_segment_under_failure_is_placeholder() {
    let json = r#"{"results": {
        "items": [{"id": 1, "type": "pronunciation", "content": "Um,", "confidence": 0.9}],
        "audio_segments": [{"items": [1], "start_time": 0, "end_time": 1}]
    }}"#;
    let translator = ScriptedTranslator::default().fail("Um,");
    let subs = run_pipeline(json, &PipelineConfig::default(), &translator)
        .await
        .unwrap();
    assert_eq!(subs[0].target_text, PLACEHOLDER);
    assert!(!subs[0].target_text.contains(ERROR_TAG));
}

#[tokio::test]
async fn empty_segments_are_not_sent() {
    let json = r#"{"results": {
        "items": [
            {"id": 1, "type": "pronunciation", "content": "mumble", "confidence": 0.05},
            {"id": 2, "type": "pronunciation", "content": "Right", "confidence": 0.99}
        ],
        "audio_segments": [
            {"items": [1], "start_time": 0, "end_time": 1},
            {"items": [], "start_time": 1, "end_time": 2},
            {"items": [99], "start_time": 2, "end_time": 3},
            {"items": [2], "start_time": 3, "end_time": 4}
        ]
    }}"#;
    let translator = ScriptedTranslator::default().reply("Right", "はい");
    let subs = run_pipeline(json, &PipelineConfig::default(), &translator)
        .await
        .unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].source_text, "Right");
    assert_eq!(translator.request_count(), 1);
}

#[tokio::test]
async fn concurrent_requests_keep_segment_order() {
    let json = r#"{"results": {
        "items": [
            {"id": 1, "type": "pronunciation", "content": "first", "confidence": 0.9},
            {"id": 2, "type": "pronunciation", "content": "second", "confidence": 0.9},
            {"id": 3, "type": "pronunciation", "content": "third", "confidence": 0.9}
        ],
        "audio_segments": [
            {"items": [1], "start_time": 0, "end_time": 1},
            {"items": [2], "start_time": 1, "end_time": 2},
            {"items": [3], "start_time": 2, "end_time": 3}
        ]
    }}"#;
    let translator = ScriptedTranslator::default()
        .reply("first", "一")
        .reply("second", "二")
        .reply("third", "三")
        .delay("first", 60)
        .delay("second", 30);
    let config = PipelineConfig {
        concurrency: 3,
        ..PipelineConfig::default()
    };
    let subs = run_pipeline(json, &config, &translator).await.unwrap();
    let texts: Vec<_> = subs.iter().map(|s| s.target_text.as_str()).collect();
    assert_eq!(texts, vec!["一", "二", "三"]);
}

#[tokio::test]
async fn timeout_aborts_without_output() {
    let json = r#"{"results": {
        "items": [{"id": 1, "type": "pronunciation", "content": "slow", "confidence": 0.9}],
        "audio_segments": [{"items": [1], "start_time": 0, "end_time": 1}]
    }}"#;
    let translator = ScriptedTranslator::default()
        .reply("slow", "遅い")
        .delay("slow", 3_000);
    let config = PipelineConfig {
        timeout_secs: Some(1),
        ..PipelineConfig::default()
    };
    let err = run_pipeline(json, &config, &translator).await.unwrap_err();
    assert!(matches!(err, PipelineError::TimedOut { secs: 1 }));
}

#[tokio::test]
async fn malformed_input_is_fatal() {
    let translator = ScriptedTranslator::default();
    for json in [r#"{"results": {}}"#, r#"{"jobName": "x"}"#, "not json"] {
        let err = run_pipeline(json, &PipelineConfig::default(), &translator)
            .await
            .unwrap_err();
        assert!(err.is_input_malformation(), "unexpected error: {}", err);
    }
    assert_eq!(translator.request_count(), 0);
}

#[tokio::test]
async fn word_level_fallback_without_segments() {
    let json = r#"{"results": {"items": [
        {"id": 0, "type": "pronunciation", "start_time": "0.0", "end_time": "0.5",
         "alternatives": [{"confidence": "0.99", "content": "Thanks"}]},
        {"id": 1, "type": "punctuation", "alternatives": [{"confidence": "0.0", "content": "."}]},
        {"id": 2, "type": "pronunciation", "start_time": "0.6", "end_time": "0.7",
         "alternatives": [{"confidence": "0.2", "content": "er"}]}
    ]}}"#;
    let translator = ScriptedTranslator::default().reply("Thanks .", "ありがとう。");
    let subs = run_pipeline(json, &PipelineConfig::default(), &translator)
        .await
        .unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].end_time, 0.5);
    assert_eq!(subs[0].target_text, "ありがとう。");
}

#[tokio::test]
async fn invalid_config_is_rejected_before_translation() {
    let translator = ScriptedTranslator::default();
    let config = PipelineConfig {
        confidence_threshold: -0.1,
        ..PipelineConfig::default()
    };
    let err = run_pipeline(HELLO_GOODBYE, &config, &translator)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidConfig(_)));
    assert_eq!(translator.request_count(), 0);
}
