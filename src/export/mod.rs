//! Export subtitles to JSON, SRT and VTT formats.

mod json;
mod srt;
mod vtt;

use crate::error::{PipelineError, PipelineResult};
use crate::subtitle::Subtitle;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Srt,
    Vtt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            other => Err(PipelineError::InvalidConfig(format!(
                "Unsupported format: {}",
                other
            ))),
        }
    }
}

/// Write subtitles to any writer. `with_source` adds the source text as a
/// second cue line (ignored for JSON, which always carries both).
pub fn write_subtitles<W: Write>(
    out: W,
    format: ExportFormat,
    subtitles: &[Subtitle],
    with_source: bool,
) -> PipelineResult<()> {
    match format {
        ExportFormat::Json => json::write_json(out, subtitles),
        ExportFormat::Srt => Ok(srt::write_srt(out, subtitles, with_source)?),
        ExportFormat::Vtt => Ok(vtt::write_vtt(out, subtitles, with_source)?),
    }
}

/// Export subtitles to a file.
pub fn export(
    path: &Path,
    format: ExportFormat,
    subtitles: &[Subtitle],
    with_source: bool,
) -> PipelineResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_subtitles(&mut writer, format, subtitles, with_source)?;
    writer.flush()?;
    Ok(())
}

/// `HH:MM:SS<sep>mmm`
fn format_timestamp(ms: u64, millis_sep: char) -> String {
    let hours = ms / 3_600_000;
    let mins = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{:02}:{:02}:{:02}{}{:03}", hours, mins, secs, millis_sep, millis)
}

fn cue_lines(sub: &Subtitle, with_source: bool) -> Vec<&str> {
    let mut lines = vec![sub.target_text.as_str()];
    if with_source && !sub.source_text.trim().is_empty() {
        lines.push(sub.source_text.as_str());
    }
    lines
}
