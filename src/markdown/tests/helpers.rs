use crate::markdown::{render_markdown, MessageRenderConfig, RenderedMessage};
use crate::ui::theme::Theme;

pub fn render_for_test(content: &str) -> RenderedMessage {
    let theme = Theme::monochrome();
    render_markdown(content, &theme, MessageRenderConfig::markdown(true, false))
}

pub fn line_texts(rendered: &RenderedMessage) -> Vec<String> {
    rendered.plain_lines()
}

pub fn assert_line_text(lines: &[String], index: usize, expected: &str) {
    assert_eq!(
        lines.get(index).map(String::as_str),
        Some(expected),
        "line {index} of {lines:#?}"
    );
}
