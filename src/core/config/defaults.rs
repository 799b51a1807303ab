use crate::core::config::data::{
    Config, DEFAULT_BACKEND_URL, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL,
    DEFAULT_MAX_UPLOAD_MB, DEFAULT_QUIZ_BASE_URL, DEFAULT_QUIZ_MODEL, DEFAULT_QUIZ_TEMPERATURE,
};
use crate::utils::url::normalize_base_url;

pub const ENV_BACKEND_URL: &str = "EDA_BACKEND_URL";
pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GROQ_KEY: &str = "GROQ_API_KEY";
pub const ENV_CHROMA_KEY: &str = "CHROMA_API_KEY";

/// An OpenAI-compatible endpoint with the model and key to use against it.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Where the environment values come from. Tests substitute a closure so they
/// never touch the process environment.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn backend_url_with(&self, env: EnvLookup<'_>) -> String {
        env(ENV_BACKEND_URL)
            .or_else(|| self.backend_url.clone())
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn backend_url(&self) -> String {
        self.backend_url_with(&process_env)
    }

    pub fn chroma_token_with(&self, env: EnvLookup<'_>) -> Option<String> {
        env(ENV_CHROMA_KEY)
    }

    pub fn chat_endpoint_with(&self, env: EnvLookup<'_>) -> Endpoint {
        Endpoint {
            base_url: self
                .chat_base_url
                .as_deref()
                .map(normalize_base_url)
                .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string()),
            model: self
                .chat_model
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            api_key: env(ENV_OPENAI_KEY),
        }
    }

    pub fn chat_endpoint(&self) -> Endpoint {
        self.chat_endpoint_with(&process_env)
    }

    pub fn quiz_endpoint_with(&self, env: EnvLookup<'_>) -> Endpoint {
        Endpoint {
            base_url: self
                .quiz_base_url
                .as_deref()
                .map(normalize_base_url)
                .unwrap_or_else(|| DEFAULT_QUIZ_BASE_URL.to_string()),
            model: self
                .quiz_model
                .clone()
                .unwrap_or_else(|| DEFAULT_QUIZ_MODEL.to_string()),
            api_key: env(ENV_GROQ_KEY),
        }
    }

    pub fn quiz_endpoint(&self) -> Endpoint {
        self.quiz_endpoint_with(&process_env)
    }

    pub fn quiz_temperature(&self) -> f32 {
        self.quiz_temperature.unwrap_or(DEFAULT_QUIZ_TEMPERATURE)
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_mb
            .filter(|mb| *mb > 0)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }
}
