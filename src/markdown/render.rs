use super::code::{flush_code_block_buffer, language_hint_from_codeblock_kind, push_codeblock_text};
use super::lists::ListKind;
use super::repair::prepare_for_render;
use super::table::TableRenderer;
use crate::core::message::{Message, Role};
use crate::ui::theme::Theme;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const USER_PREFIX: &str = "You: ";
const USER_CONTINUATION_INDENT: &str = "     ";
const DEFAULT_RULE_WIDTH: usize = 80;

/// Lines produced for one message.
#[derive(Debug, Default)]
pub struct RenderedMessage {
    pub lines: Vec<Line<'static>>,
    /// Number of code blocks, numbered from 1 in the rendered labels.
    pub code_block_count: usize,
}

impl RenderedMessage {
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.to_string()).collect()
    }
}

/// Configuration for the message renderer.
#[derive(Clone, Debug)]
pub struct MessageRenderConfig {
    pub markdown: bool,
    pub syntax_highlighting: bool,
    /// Run the split-list-marker repair before parsing.
    pub repair: bool,
    pub terminal_width: Option<usize>,
}

impl MessageRenderConfig {
    pub fn markdown(markdown_enabled: bool, syntax_highlighting: bool) -> Self {
        Self {
            markdown: markdown_enabled,
            syntax_highlighting: markdown_enabled && syntax_highlighting,
            repair: markdown_enabled,
            terminal_width: None,
        }
    }

    pub fn with_terminal_width(mut self, width: Option<usize>) -> Self {
        self.terminal_width = width;
        self
    }

    pub fn without_repair(mut self) -> Self {
        self.repair = false;
        self
    }
}

pub fn render_message_with_config(
    msg: &Message,
    theme: &Theme,
    config: MessageRenderConfig,
) -> RenderedMessage {
    match msg.role {
        Role::User => render_user_message(&msg.content, msg.attachment.as_deref(), theme),
        Role::Assistant if config.markdown => {
            if config.repair {
                let content = prepare_for_render(&msg.content);
                MarkdownRenderer::new(&content, theme, &config).render()
            } else {
                MarkdownRenderer::new(&msg.content, theme, &config).render()
            }
        }
        Role::Assistant => render_plain_assistant(&msg.content, theme),
    }
}

/// Render a markdown string as assistant output.
pub fn render_markdown(content: &str, theme: &Theme, config: MessageRenderConfig) -> RenderedMessage {
    render_message_with_config(&Message::assistant(0, content.to_string()), theme, config)
}

pub(super) struct MarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    syntax_highlighting: bool,
    terminal_width: Option<usize>,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    link_targets: Vec<String>,
    list_stack: Vec<ListKind>,
    list_indent_stack: Vec<usize>,
    pending_list_indent: Option<usize>,
    blockquote_depth: usize,
    in_code_block: Option<String>,
    code_block_lines: Vec<String>,
    code_block_count: usize,
    table_renderer: Option<TableRenderer>,
}

impl<'a> MarkdownRenderer<'a> {
    pub(super) fn new(content: &'a str, theme: &'a Theme, config: &MessageRenderConfig) -> Self {
        Self {
            content,
            theme,
            syntax_highlighting: config.syntax_highlighting,
            terminal_width: config.terminal_width,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![theme.md_paragraph_style()],
            link_targets: Vec::new(),
            list_stack: Vec::new(),
            list_indent_stack: Vec::new(),
            pending_list_indent: None,
            blockquote_depth: 0,
            in_code_block: None,
            code_block_lines: Vec::new(),
            code_block_count: 0,
            table_renderer: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.theme.md_paragraph_style())
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    pub(super) fn render(mut self) -> RenderedMessage {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_MATH);
        options.insert(Options::ENABLE_GFM);
        let mut parser = Parser::new_ext(self.content, options).peekable();

        while let Some(event) = parser.next() {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => {
                        if self.pending_list_indent.is_none() && !self.list_stack.is_empty() {
                            self.pending_list_indent = Some(self.current_list_indent_width());
                        }
                    }
                    Tag::Heading { level, .. } => {
                        self.flush_current_spans();
                        let style = self.theme.md_heading_style(level as u8);
                        self.style_stack.push(style);
                    }
                    Tag::BlockQuote(_) => {
                        self.flush_current_spans();
                        self.blockquote_depth += 1;
                        self.style_stack.push(self.theme.md_blockquote);
                    }
                    Tag::List(start) => {
                        self.flush_current_spans();
                        self.list_stack.push(match start {
                            Some(n) => ListKind::Ordered(n),
                            None => ListKind::Unordered,
                        });
                        self.list_indent_stack.push(0);
                        self.pending_list_indent = None;
                    }
                    Tag::Item => {
                        self.flush_current_spans();
                        let marker = self
                            .list_stack
                            .last_mut()
                            .map(ListKind::next_marker)
                            .unwrap_or_else(|| "• ".to_string());
                        let parent_indent: usize = self
                            .list_indent_stack
                            .iter()
                            .take(self.list_indent_stack.len().saturating_sub(1))
                            .sum();
                        if let Some(indent) = self.list_indent_stack.last_mut() {
                            *indent = marker.width();
                        }
                        self.pending_list_indent = Some(parent_indent);
                        self.push_span(Span::styled(marker, self.theme.md_list_marker));
                    }
                    Tag::CodeBlock(kind) => {
                        self.flush_current_spans();
                        self.in_code_block = Some(language_hint_from_codeblock_kind(kind));
                        self.code_block_lines.clear();
                    }
                    Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
                    Tag::Strong => self.push_modifier(Modifier::BOLD),
                    Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
                    Tag::Link { dest_url, .. } => {
                        self.style_stack.push(self.theme.md_link);
                        self.link_targets.push(dest_url.to_string());
                    }
                    Tag::Image { dest_url, .. } => {
                        self.style_stack.push(self.theme.md_link);
                        self.link_targets.push(dest_url.to_string());
                        self.push_span(Span::styled("[image: ", self.theme.md_link));
                    }
                    Tag::Table(_) => {
                        self.flush_current_spans();
                        self.table_renderer = Some(TableRenderer::new());
                    }
                    Tag::TableHead => {
                        if let Some(ref mut table) = self.table_renderer {
                            table.start_header();
                        }
                    }
                    Tag::TableRow => {
                        if let Some(ref mut table) = self.table_renderer {
                            table.start_row();
                        }
                    }
                    Tag::TableCell => {
                        if let Some(ref mut table) = self.table_renderer {
                            table.start_cell();
                        }
                    }
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Paragraph => {
                        self.flush_current_spans();
                        if self.list_stack.is_empty() {
                            self.push_empty_line();
                        } else {
                            let next_is_block = matches!(
                                parser.peek(),
                                Some(Event::Start(
                                    Tag::Paragraph
                                        | Tag::CodeBlock(_)
                                        | Tag::BlockQuote(_)
                                        | Tag::Heading { .. }
                                ))
                            );
                            if next_is_block {
                                self.push_empty_line();
                            }
                        }
                    }
                    TagEnd::Heading(_) => {
                        self.flush_current_spans();
                        self.push_empty_line();
                        self.style_stack.pop();
                    }
                    TagEnd::BlockQuote(_) => {
                        self.flush_current_spans();
                        self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                        self.style_stack.pop();
                    }
                    TagEnd::List(_) => {
                        self.flush_current_spans();
                        if self.list_stack.len() == 1 {
                            self.push_empty_line();
                        }
                        self.list_stack.pop();
                        self.list_indent_stack.pop();
                        self.pending_list_indent = None;
                    }
                    TagEnd::Item => {
                        self.flush_current_spans();
                        self.pending_list_indent = None;
                    }
                    TagEnd::CodeBlock => self.finalize_code_block(),
                    TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                        self.style_stack.pop();
                    }
                    TagEnd::Link => {
                        self.style_stack.pop();
                        self.push_link_target("");
                    }
                    TagEnd::Image => {
                        self.style_stack.pop();
                        self.push_span(Span::styled("]", self.theme.md_link));
                        self.push_link_target("image");
                    }
                    TagEnd::Table => {
                        if let Some(table) = self.table_renderer.take() {
                            for line in table.finalize(self.theme) {
                                self.push_line(line);
                            }
                            self.push_empty_line();
                        }
                    }
                    TagEnd::TableHead => {
                        if let Some(ref mut table) = self.table_renderer {
                            table.end_header();
                        }
                    }
                    TagEnd::TableRow => {
                        if let Some(ref mut table) = self.table_renderer {
                            table.end_row();
                        }
                    }
                    TagEnd::TableCell => {
                        if let Some(ref mut table) = self.table_renderer {
                            table.end_cell();
                        }
                    }
                    _ => {}
                },
                Event::Text(text) => {
                    if self.in_code_block.is_some() {
                        push_codeblock_text(&mut self.code_block_lines, &text);
                    } else {
                        let mut style = self.current_style();
                        if self
                            .table_renderer
                            .as_ref()
                            .is_some_and(TableRenderer::is_in_header)
                        {
                            style = self.theme.md_table_header;
                        }
                        self.push_inline(Span::styled(detab(&text), style));
                    }
                }
                Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                    self.push_inline(Span::styled(detab(&code), self.theme.md_inline_code));
                }
                Event::SoftBreak | Event::HardBreak => {
                    if self.table_renderer.is_some() {
                        self.push_inline(Span::raw(" "));
                    } else {
                        self.flush_current_spans();
                        if !self.list_stack.is_empty() {
                            self.pending_list_indent = Some(self.current_list_indent_width());
                        }
                    }
                }
                Event::Rule => {
                    self.flush_current_spans();
                    self.push_horizontal_rule();
                    self.push_empty_line();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.push_span(Span::styled(marker, self.theme.md_list_marker));
                }
                Event::FootnoteReference(label) => {
                    self.push_inline(Span::styled(format!("[^{label}]"), self.theme.md_link_target));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    let trimmed = html.trim();
                    if trimmed.eq_ignore_ascii_case("<br>") || trimmed.eq_ignore_ascii_case("<br/>") {
                        self.flush_current_spans();
                    } else if !trimmed.is_empty() {
                        self.push_inline(Span::styled(html.to_string(), self.theme.system_text_style));
                    }
                }
            }
        }

        // Unterminated fence at end of a partial stream
        if self.in_code_block.is_some() {
            self.finalize_code_block();
        }
        self.flush_current_spans();
        while self
            .lines
            .last()
            .is_some_and(|l| l.spans.iter().all(|s| s.content.is_empty()))
        {
            self.lines.pop();
        }
        if !self.lines.is_empty() {
            self.push_empty_line();
        }

        RenderedMessage {
            lines: self.lines,
            code_block_count: self.code_block_count,
        }
    }

    fn push_link_target(&mut self, kind: &str) {
        let Some(target) = self.link_targets.pop() else {
            return;
        };
        // Autolinks already show their target
        let shown = self
            .current_spans
            .last()
            .is_some_and(|s| s.content.as_ref() == target);
        if target.is_empty() || (shown && kind.is_empty()) {
            return;
        }
        self.push_inline(Span::styled(format!(" ({target})"), self.theme.md_link_target));
    }

    fn push_inline(&mut self, span: Span<'static>) {
        if let Some(ref mut table) = self.table_renderer {
            table.add_span(span);
        } else {
            self.push_span(span);
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current_spans.is_empty() {
            if self.blockquote_depth > 0 {
                self.current_spans.push(Span::styled(
                    "│ ".repeat(self.blockquote_depth),
                    self.theme.md_blockquote,
                ));
            }
            if let Some(indent) = self.pending_list_indent.take() {
                if indent > 0 {
                    self.current_spans.push(Span::raw(" ".repeat(indent)));
                }
            }
        }
        self.current_spans.push(span);
    }

    fn flush_current_spans(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);
        self.push_line(Line::from(spans));
    }

    fn push_line(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn push_empty_line(&mut self) {
        if self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            return;
        }
        self.push_line(Line::default());
    }

    fn push_horizontal_rule(&mut self) {
        let width = self.terminal_width.unwrap_or(DEFAULT_RULE_WIDTH).max(1);
        let rule_width = (((width as f32) * 0.8).round() as usize).clamp(1, width);
        let left_padding = width.saturating_sub(rule_width) / 2;

        let mut spans = Vec::new();
        if left_padding > 0 {
            spans.push(Span::raw(" ".repeat(left_padding)));
        }
        spans.push(Span::styled("─".repeat(rule_width), self.theme.md_rule));
        self.push_line(Line::from(spans));
    }

    fn finalize_code_block(&mut self) {
        let list_indent = self.current_list_indent_width();
        let language = self.in_code_block.take();
        flush_code_block_buffer(
            &mut self.code_block_lines,
            self.syntax_highlighting,
            language.as_deref(),
            self.theme,
            &mut self.lines,
            list_indent,
            self.code_block_count,
        );
        self.code_block_count += 1;
        self.push_empty_line();
        self.pending_list_indent = (list_indent > 0).then_some(list_indent);
    }

    fn current_list_indent_width(&self) -> usize {
        self.list_indent_stack.iter().sum()
    }
}

fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

fn render_user_message(content: &str, attachment: Option<&str>, theme: &Theme) -> RenderedMessage {
    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let lead = if idx == 0 {
            Span::styled(USER_PREFIX, theme.user_prefix_style)
        } else {
            Span::raw(USER_CONTINUATION_INDENT)
        };
        lines.push(Line::from(vec![
            lead,
            Span::styled(detab(line), theme.user_text_style),
        ]));
    }
    if let Some(attachment) = attachment {
        let lead = if lines.is_empty() {
            Span::styled(USER_PREFIX, theme.user_prefix_style)
        } else {
            Span::raw(USER_CONTINUATION_INDENT)
        };
        lines.push(Line::from(vec![
            lead,
            Span::styled(format!("📎 {attachment}"), theme.system_text_style),
        ]));
    }
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    RenderedMessage {
        lines,
        code_block_count: 0,
    }
}

fn render_plain_assistant(content: &str, theme: &Theme) -> RenderedMessage {
    let style = theme.md_paragraph_style();
    let mut lines: Vec<Line<'static>> = content
        .lines()
        .map(|line| Line::from(Span::styled(detab(line), style)))
        .collect();
    if !content.is_empty() {
        lines.push(Line::default());
    }
    RenderedMessage {
        lines,
        code_block_count: 0,
    }
}
