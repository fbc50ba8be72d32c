//! VTT (WebVTT) subtitle format writer.

use super::{cue_lines, format_timestamp};
use crate::subtitle::Subtitle;
use std::io::{self, Write};

pub fn write_vtt<W: Write>(mut out: W, subtitles: &[Subtitle], with_source: bool) -> io::Result<()> {
    writeln!(out, "WEBVTT")?;
    writeln!(out)?;

    for sub in subtitles {
        writeln!(
            out,
            "{} --> {}",
            format_timestamp(sub.start_ms(), '.'),
            format_timestamp(sub.end_ms(), '.')
        )?;
        for line in cue_lines(sub, with_source) {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
