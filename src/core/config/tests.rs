use super::data::{path_display, Config, DEFAULT_BACKEND_URL, DEFAULT_QUIZ_MODEL};
use super::defaults::{ENV_BACKEND_URL, ENV_CHROMA_KEY, ENV_GROQ_KEY, ENV_OPENAI_KEY};
use super::io::ConfigError;
use super::orchestrator::ConfigOrchestrator;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn load_nonexistent_config_gives_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = Config::load_from_path(&temp_dir.path().join("missing.toml"))
        .expect("Failed to load config");
    assert_eq!(config, Config::default());
}

#[test]
fn config_persistence_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        backend_url: Some("http://rag.local:5000".into()),
        quiz_temperature: Some(0.2),
        markdown: Some(false),
        ..Default::default()
    };
    config.save_to_path(&config_path).expect("save failed");

    let loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded, config);
    let text = std::fs::read_to_string(&config_path).expect("read failed");
    assert!(text.contains("backend_url = \"http://rag.local:5000\""));
    assert!(!text.contains("chat_model"));
}

#[test]
fn invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "markdown = \"maybe\"").expect("write failed");

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn environment_overrides_backend_url_and_supplies_keys() {
    let config = Config {
        backend_url: Some("http://configured:5000/".into()),
        ..Default::default()
    };

    let none = env_from(&[]);
    assert_eq!(config.backend_url_with(&none), "http://configured:5000");
    assert_eq!(Config::default().backend_url_with(&none), DEFAULT_BACKEND_URL);

    let env = env_from(&[
        (ENV_BACKEND_URL, "http://from-env:8000"),
        (ENV_OPENAI_KEY, "sk-openai"),
        (ENV_GROQ_KEY, "gsk-groq"),
        (ENV_CHROMA_KEY, "chroma"),
    ]);
    assert_eq!(config.backend_url_with(&env), "http://from-env:8000");
    assert_eq!(config.chat_endpoint_with(&env).api_key.as_deref(), Some("sk-openai"));
    let quiz = config.quiz_endpoint_with(&env);
    assert_eq!(quiz.api_key.as_deref(), Some("gsk-groq"));
    assert_eq!(quiz.model, DEFAULT_QUIZ_MODEL);
    assert_eq!(config.chroma_token_with(&env).as_deref(), Some("chroma"));
}

#[test]
fn zero_upload_limit_falls_back_to_default() {
    let config = Config {
        max_upload_mb: Some(0),
        ..Default::default()
    };
    assert_eq!(config.max_upload_mb(), 10);
    assert!(config.markdown_enabled());
    assert_eq!(config.theme_name(), "dark");
}

#[test]
fn describe_marks_unset_values() {
    let config = Config {
        chat_model: Some("gpt-4o-mini".into()),
        ..Default::default()
    };
    let lines = config.describe();
    assert!(lines.contains(&"  chat-model: gpt-4o-mini".to_string()));
    assert!(lines.contains(&"  markdown: (unset, default: on)".to_string()));
}

#[test]
fn orchestrator_mutate_persists_and_detects_external_updates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    orchestrator
        .mutate(|config| -> Result<(), ConfigError> {
            config.theme = Some("light".to_string());
            Ok(())
        })
        .expect("mutate failed");

    let persisted = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(persisted.theme.as_deref(), Some("light"));

    std::thread::sleep(Duration::from_millis(1100));

    let external = Config {
        theme: Some("mono".to_string()),
        ..Default::default()
    };
    external.save_to_path(&config_path).expect("external save failed");

    let reloaded = orchestrator.load_with_cache().expect("reload failed");
    assert_eq!(reloaded.theme.as_deref(), Some("mono"));
}

#[test]
fn failed_mutation_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    #[derive(Debug)]
    struct Rejected;
    impl From<ConfigError> for Rejected {
        fn from(_: ConfigError) -> Self {
            Rejected
        }
    }

    let result = orchestrator.mutate(|config| -> Result<(), Rejected> {
        config.theme = Some("never".into());
        Err(Rejected)
    });
    assert!(result.is_err());
    assert!(!config_path.exists());
}

#[cfg(unix)]
#[test]
fn path_display_abbreviates_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = std::path::PathBuf::from(home).join(".config/eda/config.toml");
        assert_eq!(path_display(&path), "~/.config/eda/config.toml");
    }
}
