//! # Settings Loader
//!
//! Centralized settings loading for the debt manager. Configuration is only
//! the credentials for the two external services (the Supabase store and the
//! Gemini API) plus the model name, loaded either from a `settings.json` file
//! or straight from environment variables.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use models::{GeminiSettings, Settings, SupabaseSettings, default_gemini_model};

/// Loads settings from a JSON file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (settings.json in the current directory).
pub fn load_default_settings() -> Result<Settings> {
    load_settings("settings.json")
}

/// Assembles settings from environment variables:
/// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`
/// - `GEMINI_API_KEY`, `GEMINI_MODEL` (default: `gemini-3-flash-preview`)
pub fn from_env() -> Result<Settings> {
    let url = env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?;
    let anon_key = env::var("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY is not set")?;
    let api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
    let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| default_gemini_model());

    Ok(Settings {
        supabase: SupabaseSettings { url, anon_key },
        gemini: GeminiSettings { api_key, model },
    })
}

/// Tries the settings file first, falling back to environment variables when
/// the file does not exist. A file that exists but fails to parse is an error,
/// not a fallback.
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Settings> {
    if settings_file_exists(&path) {
        load_settings(path)
    } else {
        from_env()
    }
}

/// Checks if a settings file exists at the given path.
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}
