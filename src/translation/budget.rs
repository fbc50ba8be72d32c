//! Character budget from segment duration.

/// Sustainable spoken characters per second for Japanese TTS narration.
pub const DEFAULT_SPEECH_RATE: f64 = 5.68;

/// `floor((end - start) * chars_per_sec)`, clamped at zero.
///
/// Negative spans and non-finite inputs yield 0.
pub fn char_budget(start_time: f64, end_time: f64, chars_per_sec: f64) -> u32 {
    let raw = (end_time - start_time) * chars_per_sec;
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    raw.floor() as u32
}
