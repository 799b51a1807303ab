//! `eda set` / `eda unset`.
//!
//! Each key is described by a [`Setting`] row: how to parse the value and
//! which config field it writes. Adding a key means adding a row.

use std::fmt;

use crate::core::config::{Config, ConfigError, ConfigOrchestrator};
use crate::utils::url::validate_base_url;

#[derive(Debug)]
pub enum SettingError {
    UnknownKey(String),
    MissingValue { key: &'static str, example: &'static str },
    InvalidValue { key: &'static str, reason: String },
    Config(ConfigError),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                write!(f, "Unknown config key: {key}. Known keys: {}", known_keys())
            }
            SettingError::MissingValue { key, example } => {
                write!(f, "Missing value for {key}. Example: {example}")
            }
            SettingError::InvalidValue { key, reason } => write!(f, "Invalid {key}: {reason}"),
            SettingError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SettingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SettingError {
    fn from(err: ConfigError) -> Self {
        SettingError::Config(err)
    }
}

#[derive(Clone, Copy)]
enum ValueKind {
    Url,
    Text,
    Bool,
    Temperature,
    Megabytes,
    Theme,
}

struct Setting {
    key: &'static str,
    kind: ValueKind,
    example: &'static str,
    apply: fn(&mut Config, Option<ParsedValue>),
}

#[derive(Debug, Clone, PartialEq)]
enum ParsedValue {
    Text(String),
    Bool(bool),
    Float(f32),
    Unsigned(u64),
}

impl ParsedValue {
    fn text(self) -> Option<String> {
        match self {
            ParsedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn flag(self) -> Option<bool> {
        match self {
            ParsedValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

const SETTINGS: &[Setting] = &[
    Setting {
        key: "backend-url",
        kind: ValueKind::Url,
        example: "eda set backend-url http://localhost:5000",
        apply: |c, v| c.backend_url = v.and_then(ParsedValue::text),
    },
    Setting {
        key: "chat-base-url",
        kind: ValueKind::Url,
        example: "eda set chat-base-url https://api.openai.com/v1",
        apply: |c, v| c.chat_base_url = v.and_then(ParsedValue::text),
    },
    Setting {
        key: "chat-model",
        kind: ValueKind::Text,
        example: "eda set chat-model gpt-4o-mini",
        apply: |c, v| c.chat_model = v.and_then(ParsedValue::text),
    },
    Setting {
        key: "quiz-base-url",
        kind: ValueKind::Url,
        example: "eda set quiz-base-url https://api.groq.com/openai/v1",
        apply: |c, v| c.quiz_base_url = v.and_then(ParsedValue::text),
    },
    Setting {
        key: "quiz-model",
        kind: ValueKind::Text,
        example: "eda set quiz-model llama3-70b-8192",
        apply: |c, v| c.quiz_model = v.and_then(ParsedValue::text),
    },
    Setting {
        key: "quiz-temperature",
        kind: ValueKind::Temperature,
        example: "eda set quiz-temperature 0.7",
        apply: |c, v| {
            c.quiz_temperature = match v {
                Some(ParsedValue::Float(t)) => Some(t),
                _ => None,
            }
        },
    },
    Setting {
        key: "max-upload-mb",
        kind: ValueKind::Megabytes,
        example: "eda set max-upload-mb 5",
        apply: |c, v| {
            c.max_upload_mb = match v {
                Some(ParsedValue::Unsigned(mb)) => Some(mb),
                _ => None,
            }
        },
    },
    Setting {
        key: "markdown",
        kind: ValueKind::Bool,
        example: "eda set markdown off",
        apply: |c, v| c.markdown = v.and_then(ParsedValue::flag),
    },
    Setting {
        key: "syntax",
        kind: ValueKind::Bool,
        example: "eda set syntax off",
        apply: |c, v| c.syntax = v.and_then(ParsedValue::flag),
    },
    Setting {
        key: "theme",
        kind: ValueKind::Theme,
        example: "eda set theme light",
        apply: |c, v| c.theme = v.and_then(ParsedValue::text),
    },
];

const THEMES: &[&str] = &["dark", "light", "mono"];

fn known_keys() -> String {
    SETTINGS
        .iter()
        .map(|s| s.key)
        .collect::<Vec<_>>()
        .join(", ")
}

fn find_setting(key: &str) -> Result<&'static Setting, SettingError> {
    let normalized = key.trim().to_ascii_lowercase().replace('_', "-");
    SETTINGS
        .iter()
        .find(|s| s.key == normalized)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
}

/// Parse a boolean value from user input: on/off, true/false, yes/no.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_value(setting: &Setting, input: &str) -> Result<ParsedValue, SettingError> {
    let invalid = |reason: String| SettingError::InvalidValue {
        key: setting.key,
        reason,
    };
    match setting.kind {
        ValueKind::Url => validate_base_url(input).map(ParsedValue::Text).map_err(invalid),
        ValueKind::Text => Ok(ParsedValue::Text(input.to_string())),
        ValueKind::Bool => parse_bool(input)
            .map(ParsedValue::Bool)
            .ok_or_else(|| invalid(format!("'{input}' is not on/off"))),
        ValueKind::Temperature => match input.parse::<f32>() {
            Ok(t) if (0.0..=2.0).contains(&t) => Ok(ParsedValue::Float(t)),
            _ => Err(invalid(format!("'{input}' is not a number between 0 and 2"))),
        },
        ValueKind::Megabytes => match input.parse::<u64>() {
            Ok(mb) if mb > 0 => Ok(ParsedValue::Unsigned(mb)),
            _ => Err(invalid(format!("'{input}' is not a positive whole number"))),
        },
        ValueKind::Theme => {
            let name = input.to_ascii_lowercase();
            if THEMES.contains(&name.as_str()) {
                Ok(ParsedValue::Text(name))
            } else {
                Err(invalid(format!("choose one of {}", THEMES.join(", "))))
            }
        }
    }
}

/// Apply `eda set <key> <value...>` to `config`, returning the confirmation line.
pub fn set_in(config: &mut Config, key: &str, value: &[String]) -> Result<String, SettingError> {
    let setting = find_setting(key)?;
    let input = value.join(" ");
    let input = input.trim();
    if input.is_empty() {
        return Err(SettingError::MissingValue {
            key: setting.key,
            example: setting.example,
        });
    }
    let parsed = parse_value(setting, input)?;
    let display = match &parsed {
        ParsedValue::Text(s) => s.clone(),
        ParsedValue::Bool(b) => (if *b { "on" } else { "off" }).to_string(),
        ParsedValue::Float(t) => t.to_string(),
        ParsedValue::Unsigned(n) => n.to_string(),
    };
    (setting.apply)(config, Some(parsed));
    Ok(format!("✅ Set {} to: {display}", setting.key))
}

pub fn unset_in(config: &mut Config, key: &str) -> Result<String, SettingError> {
    let setting = find_setting(key)?;
    (setting.apply)(config, None);
    Ok(format!("✅ Unset {} (will use the default)", setting.key))
}

pub fn run_set(
    orchestrator: &ConfigOrchestrator,
    key: Option<String>,
    value: Vec<String>,
) -> Result<(), SettingError> {
    let Some(key) = key else {
        orchestrator.load_with_cache()?.print_all();
        return Ok(());
    };
    let message = orchestrator.mutate(|config| set_in(config, &key, &value))?;
    println!("{message}");
    Ok(())
}

pub fn run_unset(orchestrator: &ConfigOrchestrator, key: String) -> Result<(), SettingError> {
    let message = orchestrator.mutate(|config| unset_in(config, &key))?;
    println!("{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn set_and_unset_round_trip_fields() {
        let mut config = Config::default();
        let message = set_in(&mut config, "backend-url", &args(&["http://rag:5000/"])).expect("set");
        assert_eq!(message, "✅ Set backend-url to: http://rag:5000");
        assert_eq!(config.backend_url.as_deref(), Some("http://rag:5000"));

        set_in(&mut config, "markdown", &args(&["OFF"])).expect("set");
        assert_eq!(config.markdown, Some(false));

        set_in(&mut config, "quiz_temperature", &args(&["0.7"])).expect("set");
        assert_eq!(config.quiz_temperature, Some(0.7));

        unset_in(&mut config, "markdown").expect("unset");
        assert_eq!(config.markdown, None);
    }

    #[test]
    fn multi_word_values_are_joined() {
        let mut config = Config::default();
        set_in(&mut config, "chat-model", &args(&["my", "model"])).expect("set");
        assert_eq!(config.chat_model.as_deref(), Some("my model"));
    }

    #[test]
    fn invalid_values_leave_config_untouched() {
        let mut config = Config::default();
        assert!(matches!(
            set_in(&mut config, "max-upload-mb", &args(&["0"])),
            Err(SettingError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_in(&mut config, "theme", &args(&["neon"])),
            Err(SettingError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_in(&mut config, "backend-url", &args(&["localhost"])),
            Err(SettingError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_in(&mut config, "syntax", &[]),
            Err(SettingError::MissingValue { .. })
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_key_lists_known_keys() {
        let err = unset_in(&mut Config::default(), "default-model").unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Unknown config key: default-model"));
        assert!(text.contains("backend-url"));
    }

    #[test]
    fn run_set_persists_through_orchestrator() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let orchestrator = ConfigOrchestrator::new(dir.path().join("config.toml"));
        run_set(&orchestrator, Some("theme".into()), args(&["Light"])).expect("set");
        let loaded = Config::load_from_path(orchestrator.path()).expect("load");
        assert_eq!(loaded.theme.as_deref(), Some("light"));

        run_unset(&orchestrator, "theme".into()).expect("unset");
        let loaded = Config::load_from_path(orchestrator.path()).expect("load");
        assert_eq!(loaded.theme, None);
    }
}
