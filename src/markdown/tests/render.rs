use super::helpers::{assert_line_text, line_texts, render_for_test};
use crate::core::message::Message;
use crate::markdown::{render_markdown, render_message_with_config, MessageRenderConfig};
use crate::ui::theme::Theme;
use ratatui::style::Modifier;

#[test]
fn split_marker_renders_as_single_item_after_repair() {
    let lines = line_texts(&render_for_test("1.\nFoo bar\n"));
    assert_eq!(lines, vec!["1. Foo bar", ""]);
}

#[test]
fn split_marker_without_repair_leaves_empty_item() {
    let theme = Theme::monochrome();
    let rendered = render_markdown(
        "1.\nFoo bar\n",
        &theme,
        MessageRenderConfig::markdown(true, false).without_repair(),
    );
    let lines = line_texts(&rendered);
    assert_line_text(&lines, 0, "1. ");
    assert!(lines.iter().any(|l| l == "Foo bar"));
}

#[test]
fn continuation_lines_stay_inside_the_item() {
    let lines = line_texts(&render_for_test("- \nLine A\nLine B\n"));
    assert_eq!(lines, vec!["• Line A", "  Line B", ""]);
}

#[test]
fn nested_lists_indent_under_parent_text() {
    let lines = line_texts(&render_for_test("1. parent\n   - child\n2. next\n"));
    assert_eq!(lines, vec!["1. parent", "   • child", "2. next", ""]);
}

#[test]
fn headings_use_level_styles() {
    let theme = Theme::dark_default();
    let rendered = render_markdown(
        "# Title\n\n### Section\n",
        &theme,
        MessageRenderConfig::markdown(true, false),
    );
    assert_eq!(rendered.lines[0].to_string(), "Title");
    assert_eq!(rendered.lines[0].spans[0].style, theme.md_heading_style(1));
    assert_eq!(rendered.lines[2].spans[0].style, theme.md_heading_style(3));
}

#[test]
fn code_blocks_get_numbered_language_labels() {
    let rendered = render_for_test("Run:\n\n```bash\nls -la\n```\n\n```\nplain\n```\n");
    let lines = line_texts(&rendered);
    assert_eq!(rendered.code_block_count, 2);
    assert!(lines.contains(&"┌ bash · #1".to_string()));
    assert!(lines.contains(&"ls -la".to_string()));
    assert!(lines.contains(&"┌ code · #2".to_string()));
}

#[test]
fn code_block_contents_are_not_list_repaired() {
    let lines = line_texts(&render_for_test("```\n-\nitem\n```\n"));
    assert_eq!(lines, vec!["┌ code · #1", "-", "item", ""]);
}

#[test]
fn links_show_their_target() {
    let lines = line_texts(&render_for_test("See [docs](https://example.com/docs).\n"));
    assert_eq!(lines[0], "See docs (https://example.com/docs).");
}

#[test]
fn autolinks_do_not_repeat_target() {
    let lines = line_texts(&render_for_test("<https://example.com>\n"));
    assert_eq!(lines[0], "https://example.com");
}

#[test]
fn tables_render_with_borders() {
    let lines = line_texts(&render_for_test("| a | bb |\n|---|----|\n| 1 | 2 |\n"));
    assert_eq!(lines[0], "┌───┬────┐");
    assert_eq!(lines[1], "│ a │ bb │");
    assert_eq!(lines[3], "│ 1 │ 2  │");
    assert_eq!(lines[4], "└───┴────┘");
}

#[test]
fn blockquotes_are_prefixed() {
    let lines = line_texts(&render_for_test("> quoted text\n"));
    assert_eq!(lines[0], "│ quoted text");
}

#[test]
fn emphasis_and_strong_apply_modifiers() {
    let theme = Theme::monochrome();
    let rendered = render_markdown(
        "*soft* and **loud**\n",
        &theme,
        MessageRenderConfig::markdown(true, false),
    );
    let spans = &rendered.lines[0].spans;
    assert!(spans[0].style.add_modifier.contains(Modifier::ITALIC));
    assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
}

#[test]
fn rendering_is_idempotent() {
    let content = "# Notes\n\n1.\nFirst\n2.\nSecond\n\n```rust\nfn main() {}\n```\n";
    let theme = Theme::dark_default();
    let first = render_markdown(content, &theme, MessageRenderConfig::markdown(true, true));
    let second = render_markdown(content, &theme, MessageRenderConfig::markdown(true, true));
    assert_eq!(first.lines, second.lines);
}

#[test]
fn user_messages_are_prefixed_and_not_parsed() {
    let theme = Theme::monochrome();
    let msg = Message::user(1, "# not a heading\nsecond".into(), Some("notes.pdf".into()));
    let rendered =
        render_message_with_config(&msg, &theme, MessageRenderConfig::markdown(true, false));
    let lines = line_texts(&rendered);
    assert_eq!(
        lines,
        vec![
            "You: # not a heading",
            "     second",
            "     📎 notes.pdf",
            ""
        ]
    );
}

#[test]
fn markdown_disabled_keeps_raw_lines() {
    let theme = Theme::monochrome();
    let rendered = render_markdown("**raw**\n- x", &theme, MessageRenderConfig::markdown(false, true));
    assert_eq!(line_texts(&rendered), vec!["**raw**", "- x", ""]);
}

#[test]
fn horizontal_rule_respects_width() {
    let theme = Theme::monochrome();
    let rendered = render_markdown(
        "above\n\n---\n\nbelow\n",
        &theme,
        MessageRenderConfig::markdown(true, false).with_terminal_width(Some(10)),
    );
    let lines = line_texts(&rendered);
    assert_line_text(&lines, 2, " ────────");
}
