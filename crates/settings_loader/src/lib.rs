//! # Settings Loader
//!
//! Loads the aggregator configuration from a JSON file (by default `settings.json`).
//! Every field has a default, so a partial file (or no file at all) is valid.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let settings = settings_loader::load_settings("config/settings.json")?;
//!
//! // Fall back to defaults when the optional file is absent
//! let path = Some(PathBuf::from("settings.json"));
//! let settings = settings_loader::load_settings_or_default(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from an optional path, returning None if no path is provided
pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

/// Explicit path must load. Without one, `settings.json` in the current directory is
/// used if present, otherwise the built-in defaults.
pub fn load_settings_or_default(path: Option<&PathBuf>) -> Result<Settings> {
    if let Some(settings) = load_optional_settings(path)? {
        return Ok(settings);
    }

    if settings_file_exists(DEFAULT_SETTINGS_FILE) {
        return load_settings(DEFAULT_SETTINGS_FILE);
    }

    tracing::debug!("No settings file found, using defaults");
    Ok(Settings::default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "scheme_title": "Other Fund", "start_year": 2024 }}"#).unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.scheme_title, "Other Fund");
        assert_eq!(settings.start_year, 2024);
        assert_eq!(settings.file_prefix, Settings::default().file_prefix);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = PathBuf::from("definitely/missing/settings.json");
        assert!(load_settings_or_default(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_settings(file.path()).is_err());
    }
}
