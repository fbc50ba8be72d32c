pub mod config;
pub mod error;
pub mod export;
pub mod paths;
pub mod subtitle;
pub mod transcript;
pub mod translation;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use subtitle::{Subtitle, SubtitleAssembler};
pub use transcript::Transcript;
pub use translation::Translator;

use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use transcript::clean_segments;
use translation::{char_budget, TranslationRequester, ERROR_TAG};

/// Translate every surviving segment of `transcript` into a subtitle.
///
/// Never fails: per-segment translation problems end up in-band in the
/// subtitle text. Output order follows segment order even when
/// `config.concurrency` allows several requests in flight.
pub async fn translate_transcript(
    transcript: &Transcript,
    config: &PipelineConfig,
    translator: &dyn Translator,
) -> Vec<Subtitle> {
    let segments = clean_segments(transcript, config.confidence_threshold);
    info!(
        "[translate] START: {} segments after filtering, backend={}, concurrency={}",
        segments.len(),
        translator.id(),
        config.concurrency
    );

    let requester = TranslationRequester::new(
        translator,
        config.style_contract(),
        config.fallback_policy(),
    );
    let requester = &requester;

    let texts: Vec<String> = stream::iter(segments.iter().enumerate())
        .map(|(i, seg)| async move {
            let budget = char_budget(seg.start_time, seg.end_time, config.speech_rate);
            if budget == 0 {
                warn!(
                    "[translate] segment {}: zero budget for {:.3}..{:.3}s",
                    i, seg.start_time, seg.end_time
                );
            }
            let text = requester.translate_text(&seg.transcript, budget).await;
            debug!(
                "[translate] segment {}: budget={} len={} preview={:?}",
                i,
                budget,
                text.chars().count(),
                text.chars().take(50).collect::<String>()
            );
            text
        })
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let mut assembler = SubtitleAssembler::with_capacity(segments.len());
    for (seg, text) in segments.iter().zip(texts) {
        assembler.push(seg, text);
    }
    let subtitles = assembler.finish();

    let failed = subtitles
        .iter()
        .filter(|s| s.target_text.starts_with(ERROR_TAG))
        .count();
    if failed > 0 {
        warn!("[translate] {} of {} segments failed to translate", failed, subtitles.len());
    }
    info!("[translate] DONE: {} subtitles", subtitles.len());
    subtitles
}

/// Ingest a raw transcript and run the whole pipeline.
///
/// Fails only on malformed input, invalid configuration, or when the
/// configured timeout elapses; a timeout yields no partial output.
pub async fn run_pipeline(
    transcript_json: &str,
    config: &PipelineConfig,
    translator: &dyn Translator,
) -> PipelineResult<Vec<Subtitle>> {
    config.validate()?;
    let transcript = Transcript::from_json_str(transcript_json)?;
    debug!(
        "[ingest] {} items, {} segments",
        transcript.items.len(),
        transcript
            .segments
            .as_ref()
            .map_or_else(|| "no".to_string(), |s| s.len().to_string())
    );

    let work = translate_transcript(&transcript, config, translator);
    match config.timeout() {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .map_err(|_| PipelineError::TimedOut {
                secs: limit.as_secs(),
            }),
        None => Ok(work.await),
    }
}

/// Log to stderr and to the log file under the app data directory.
/// Returns the log file path when file logging could be set up.
pub fn init_logger(level: log::LevelFilter) -> Result<Option<std::path::PathBuf>, fern::InitError> {
    let format = |out: fern::FormatCallback<'_>, message: &std::fmt::Arguments<'_>, record: &log::Record| {
        out.finish(format_args!(
            "[{}][{}][{}][{:?}] {}",
            chrono::Local::now().format("%Y-%m-%d"),
            chrono::Local::now().format("%H:%M:%S"),
            record.target(),
            record.level(),
            message
        ))
    };

    let mut dispatch = fern::Dispatch::new()
        .format(format)
        .level(log::LevelFilter::Warn)
        .level_for("dubscribe", level)
        .chain(std::io::stderr());

    let log_file = paths::log_file_path().ok();
    if let Some(ref path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }
    dispatch.apply()?;

    Ok(log_file)
}
