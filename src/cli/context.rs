//! State shared by every subcommand.

use std::error::Error;
use std::io::{self, IsTerminal};
use std::time::Duration;

use crate::api::backend::BackendClient;
use crate::core::config::defaults::process_env;
use crate::core::config::Config;
use crate::core::message::Message;
use crate::markdown::{render_message_with_config, MessageRenderConfig, RenderedMessage};
use crate::ui::ansi::{terminal_width, write_lines};
use crate::ui::theme::Theme;
use ratatui::text::Line;

pub struct CliContext {
    pub config: Config,
    pub client: reqwest::Client,
    pub theme: Theme,
    styled: bool,
}

impl CliContext {
    pub fn new(config: Config) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()?;
        let styled = io::stdout().is_terminal();
        let theme = if styled {
            Theme::from_name(config.theme_name())
        } else {
            Theme::monochrome()
        };
        Ok(Self {
            config,
            client,
            theme,
            styled,
        })
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::new(Config::load()?)
    }

    pub fn backend(&self) -> BackendClient {
        BackendClient::new(
            self.client.clone(),
            self.config.backend_url(),
            self.config.chroma_token_with(&process_env),
        )
    }

    pub fn render_config(&self) -> MessageRenderConfig {
        MessageRenderConfig::markdown(
            self.config.markdown_enabled(),
            self.config.syntax_enabled() && self.styled,
        )
        .with_terminal_width(terminal_width())
    }

    pub fn render(&self, message: &Message) -> RenderedMessage {
        render_message_with_config(message, &self.theme, self.render_config())
    }

    /// Print pre-built lines with this context's styling policy.
    pub fn print_lines(&self, lines: &[Line<'_>]) -> io::Result<()> {
        write_lines(&mut io::stdout().lock(), lines, self.styled)
    }

    /// Print an error block on stderr in the theme's error style.
    pub fn print_error(&self, text: &str) -> io::Result<()> {
        let lines: Vec<Line<'_>> = text
            .lines()
            .map(|line| Line::styled(line, self.theme.error_text_style))
            .collect();
        write_lines(&mut io::stderr().lock(), &lines, io::stderr().is_terminal())
    }

    /// Render and print a message, returning how many code blocks it had.
    pub fn print_message(&self, message: &Message) -> io::Result<usize> {
        let rendered = self.render(message);
        self.print_lines(&rendered.lines)?;
        Ok(rendered.code_block_count)
    }
}
