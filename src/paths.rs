//! Path utilities for app data, settings, logs, and output artifacts.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "dubscribe";

/// Get the app data directory (e.g. ~/.local/share/dubscribe on Linux).
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

/// Get the path to the settings file.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(app_data_dir)
        .join("settings.json")
}

/// Get the log directory.
pub fn log_dir() -> PathBuf {
    app_data_dir().join("logs")
}

/// Get the log file path, creating its directory if necessary.
pub fn log_file_path() -> std::io::Result<PathBuf> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("dubscribe.log"))
}

/// Output path for a translated artifact: `<stem>_ja.<ext>` next to the input,
/// or inside `out_dir` when given.
pub fn translated_output_path(input: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());
    let file_name = format!("{}_ja.{}", stem, extension);
    match out_dir.or_else(|| input.parent()) {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Output path for a cleaned transcript: `<stem>_clean.json` next to the input.
pub fn cleaned_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());
    input.with_file_name(format!("{}_clean.json", stem))
}
