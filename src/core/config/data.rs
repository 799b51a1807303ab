use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_QUIZ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_QUIZ_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_QUIZ_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;
pub const DEFAULT_QUIZ_COUNT: usize = 15;

/// Persisted settings. Every field is optional so an unset key falls back to
/// its default and `eda unset` can clear it.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the document backend (`/upload`, `/search`, `/extract_text`)
    pub backend_url: Option<String>,
    /// OpenAI-compatible endpoint used for chat answers
    pub chat_base_url: Option<String>,
    pub chat_model: Option<String>,
    /// OpenAI-compatible endpoint used for quiz generation
    pub quiz_base_url: Option<String>,
    pub quiz_model: Option<String>,
    pub quiz_temperature: Option<f32>,
    /// Upload size limit in megabytes
    pub max_upload_mb: Option<u64>,
    /// Enable markdown rendering of answers
    pub markdown: Option<bool>,
    /// Enable syntax highlighting for fenced code blocks when markdown is enabled
    pub syntax: Option<bool>,
    /// Theme name ("dark", "light", "mono")
    pub theme: Option<String>,
}

/// Get a user-friendly display string for a path, using `~` for the home
/// directory on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
