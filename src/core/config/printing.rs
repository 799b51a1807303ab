use crate::core::config::data::Config;
use crate::core::config::defaults::process_env;

impl Config {
    /// Lines describing the effective configuration, marking values that fall
    /// back to a default.
    pub fn describe(&self) -> Vec<String> {
        fn line<T: std::fmt::Display>(key: &str, set: Option<T>, effective: impl std::fmt::Display) -> String {
            match set {
                Some(value) => format!("  {key}: {value}"),
                None => format!("  {key}: (unset, default: {effective})"),
            }
        }
        let on_off = |value: bool| if value { "on" } else { "off" };
        let chat = self.chat_endpoint_with(&process_env);
        let quiz = self.quiz_endpoint_with(&process_env);

        vec![
            line("backend-url", self.backend_url.as_deref(), self.backend_url()),
            line("chat-base-url", self.chat_base_url.as_deref(), &chat.base_url),
            line("chat-model", self.chat_model.as_deref(), &chat.model),
            line("quiz-base-url", self.quiz_base_url.as_deref(), &quiz.base_url),
            line("quiz-model", self.quiz_model.as_deref(), &quiz.model),
            line("quiz-temperature", self.quiz_temperature, self.quiz_temperature()),
            line("max-upload-mb", self.max_upload_mb, self.max_upload_mb()),
            line("markdown", self.markdown.map(on_off), on_off(self.markdown_enabled())),
            line("syntax", self.syntax.map(on_off), on_off(self.syntax_enabled())),
            line("theme", self.theme.as_deref(), self.theme_name()),
        ]
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.describe() {
            println!("{line}");
        }
        let key_state = |present: bool| if present { "set" } else { "missing" };
        println!(
            "  api keys: OpenAI {}, Groq {}, Chroma {}",
            key_state(self.chat_endpoint().api_key.is_some()),
            key_state(self.quiz_endpoint().api_key.is_some()),
            key_state(self.chroma_token_with(&process_env).is_some()),
        );
    }
}
