//! JSON subtitle artifact writer.

use crate::error::PipelineResult;
use crate::subtitle::Subtitle;
use std::io::Write;

/// Pretty-printed array; non-ASCII text is written as-is.
pub fn write_json<W: Write>(mut out: W, subtitles: &[Subtitle]) -> PipelineResult<()> {
    serde_json::to_writer_pretty(&mut out, subtitles)?;
    writeln!(out)?;
    Ok(())
}
