use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Used to pick a matching syntax highlighting palette
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub error_text_style: Style,

    // Markdown
    pub md_heading_styles: [Style; 6],
    pub md_blockquote: Style,
    pub md_list_marker: Style,
    pub md_link: Style,
    pub md_link_target: Style,
    pub md_inline_code: Style,
    pub md_codeblock_text: Style,
    pub md_codeblock_bg: Option<Color>,
    pub md_codeblock_label: Style,
    pub md_rule: Style,
    pub md_table_border: Style,
    pub md_table_header: Style,

    // Flashcards
    pub card_question_style: Style,
    pub card_answer_style: Style,
    pub card_explanation_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default().fg(Color::DarkGray),
            error_text_style: Style::default().fg(Color::LightRed),

            md_heading_styles: [
                bold.fg(Color::LightYellow).add_modifier(Modifier::UNDERLINED),
                bold.fg(Color::LightYellow),
                bold.fg(Color::Yellow),
                bold.fg(Color::White),
                bold.fg(Color::Gray),
                bold.fg(Color::DarkGray),
            ],
            md_blockquote: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            md_list_marker: Style::default().fg(Color::LightYellow),
            md_link: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_link_target: Style::default().fg(Color::DarkGray),
            md_inline_code: Style::default().fg(Color::LightGreen),
            md_codeblock_text: Style::default().fg(Color::Rgb(248, 248, 242)),
            md_codeblock_bg: Some(Color::Rgb(30, 30, 30)),
            md_codeblock_label: Style::default().fg(Color::DarkGray),
            md_rule: Style::default().fg(Color::DarkGray),
            md_table_border: Style::default().fg(Color::DarkGray),
            md_table_header: bold.fg(Color::Gray),

            card_question_style: bold.fg(Color::LightYellow),
            card_answer_style: Style::default().fg(Color::White),
            card_explanation_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        }
    }

    pub fn light() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_text_style: Style::default().fg(Color::Black),
            system_text_style: Style::default().fg(Color::Gray),
            error_text_style: Style::default().fg(Color::Red),

            md_heading_styles: [
                bold.fg(Color::Rgb(17, 24, 39))
                    .add_modifier(Modifier::UNDERLINED),
                bold.fg(Color::Rgb(17, 24, 39)),
                bold.fg(Color::Rgb(31, 41, 55)),
                bold.fg(Color::Rgb(55, 65, 81)),
                bold.fg(Color::Rgb(75, 85, 99)),
                bold.fg(Color::Rgb(107, 114, 128)),
            ],
            md_blockquote: Style::default()
                .fg(Color::Rgb(75, 85, 99))
                .add_modifier(Modifier::ITALIC),
            md_list_marker: Style::default().fg(Color::Rgb(234, 88, 12)),
            md_link: Style::default()
                .fg(Color::Rgb(37, 99, 235))
                .add_modifier(Modifier::UNDERLINED),
            md_link_target: Style::default().fg(Color::Gray),
            md_inline_code: Style::default().fg(Color::Rgb(31, 41, 55)),
            md_codeblock_text: Style::default().fg(Color::Rgb(31, 41, 55)),
            md_codeblock_bg: Some(Color::Rgb(243, 244, 246)),
            md_codeblock_label: Style::default().fg(Color::Rgb(107, 114, 128)),
            md_rule: Style::default().fg(Color::Gray),
            md_table_border: Style::default().fg(Color::Gray),
            md_table_header: bold.fg(Color::Rgb(107, 114, 128)),

            card_question_style: bold.fg(Color::Rgb(234, 88, 12)),
            card_answer_style: Style::default().fg(Color::Black),
            card_explanation_style: Style::default()
                .fg(Color::Rgb(75, 85, 99))
                .add_modifier(Modifier::ITALIC),
        }
    }

    /// Modifier-only theme for output that is piped or saved.
    pub fn monochrome() -> Self {
        let plain = Style::default();
        let bold = plain.add_modifier(Modifier::BOLD);
        Theme {
            background_color: Color::Reset,
            user_prefix_style: bold,
            user_text_style: plain,
            assistant_text_style: plain,
            system_text_style: plain,
            error_text_style: bold,

            md_heading_styles: [bold.add_modifier(Modifier::UNDERLINED), bold, bold, bold, bold, bold],
            md_blockquote: plain.add_modifier(Modifier::ITALIC),
            md_list_marker: plain,
            md_link: plain.add_modifier(Modifier::UNDERLINED),
            md_link_target: plain,
            md_inline_code: plain,
            md_codeblock_text: plain,
            md_codeblock_bg: None,
            md_codeblock_label: plain,
            md_rule: plain,
            md_table_border: plain,
            md_table_header: bold,

            card_question_style: bold,
            card_answer_style: plain,
            card_explanation_style: plain.add_modifier(Modifier::ITALIC),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dark" | "default" | "default-dark" => Self::dark_default(),
            "light" => Self::light(),
            "mono" | "monochrome" | "plain" => Self::monochrome(),
            // Fallback
            _ => Self::dark_default(),
        }
    }

    /// Style for a heading of the given level (1-6). Out-of-range levels clamp.
    pub fn md_heading_style(&self, level: u8) -> Style {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        self.md_heading_styles[idx]
    }

    pub fn md_paragraph_style(&self) -> Style {
        self.assistant_text_style
    }

    pub fn md_codeblock_style(&self) -> Style {
        match self.md_codeblock_bg {
            Some(bg) => self.md_codeblock_text.bg(bg),
            None => self.md_codeblock_text,
        }
    }
}
