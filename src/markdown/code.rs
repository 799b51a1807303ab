use super::highlight::highlight_code_block;
use crate::ui::theme::Theme;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::text::{Line, Span};

/// A fenced or indented code block found in a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

pub(super) fn language_hint_from_codeblock_kind(kind: CodeBlockKind) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info.split_ascii_whitespace().next().unwrap_or("").into(),
    }
}

pub(super) fn push_codeblock_text(code_block_lines: &mut Vec<String>, text: &str) {
    for l in text.lines() {
        code_block_lines.push(l.replace('\t', "    "));
    }
}

fn plain_codeblock_lines(code_block_lines: &[String], theme: &Theme) -> Vec<Line<'static>> {
    let style = theme.md_codeblock_style();
    code_block_lines
        .iter()
        .map(|line| Line::from(vec![Span::styled(line.clone(), style)]))
        .collect()
}

/// Header shown above every code block: the language (or `code`) and the
/// 1-based number used by `/copy`.
fn code_block_label(language_hint: Option<&str>, block_number: usize, theme: &Theme) -> Line<'static> {
    let language = language_hint.filter(|s| !s.is_empty()).unwrap_or("code");
    Line::from(vec![Span::styled(
        format!("┌ {language} · #{block_number}"),
        theme.md_codeblock_label,
    )])
}

pub(super) fn flush_code_block_buffer(
    code_block_lines: &mut Vec<String>,
    syntax_enabled: bool,
    language_hint: Option<&str>,
    theme: &Theme,
    lines: &mut Vec<Line<'static>>,
    list_indent: usize,
    block_index: usize,
) {
    let indent = (list_indent > 0).then(|| " ".repeat(list_indent));
    let mut label = code_block_label(language_hint, block_index + 1, theme);
    if let Some(indent) = indent.as_ref() {
        label.spans.insert(0, Span::raw(indent.clone()));
    }
    lines.push(label);

    let produced_lines = if syntax_enabled {
        let joined = code_block_lines.join("\n");
        highlight_code_block(language_hint.unwrap_or(""), &joined, theme)
            .unwrap_or_else(|| plain_codeblock_lines(code_block_lines, theme))
    } else {
        plain_codeblock_lines(code_block_lines, theme)
    };

    for mut line in produced_lines {
        if let Some(indent) = indent.as_ref() {
            line.spans.insert(0, Span::raw(indent.clone()));
        }
        lines.push(line);
    }

    code_block_lines.clear();
}

/// Collect every code block in `content`, in document order.
pub fn code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for event in Parser::new_ext(content, Options::all()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let hint = language_hint_from_codeblock_kind(kind);
                current = Some(CodeBlock {
                    language: (!hint.is_empty()).then_some(hint),
                    code: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(mut block) = current.take() {
                    if block.code.ends_with('\n') {
                        block.code.pop();
                    }
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}
