//! Repair pass for markdown that arrived token-by-token.
//!
//! Streaming models sometimes emit a list marker on a line of its own and put
//! the item text on the next line (`"1.\nFoo"`). A markdown parser reads that
//! as an empty item followed by a paragraph. [`repair_markdown`] rejoins the
//! marker with its content and indents the lines that belong to the same item,
//! leaving fenced code untouched.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

/// Leading whitespace, three or more backticks or tildes, then any info
/// string. Backtick fences may not carry a backtick in the info string.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(?:`{3,}[^`]*|~{3,}.*)$").expect("fence pattern is valid")
});

/// A list marker with nothing but whitespace after it.
static MARKER_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+\.|[*+-])\s*$").expect("marker pattern is valid")
});

/// A line that opens a list item (marker followed by whitespace or end of line).
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+\.|[*+-])(?:\s|$)").expect("list item pattern is valid")
});

/// Marker left alone on its line and followed by blank lines.
static DANGLING_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*(?:\d+\.|[*+-]))[ \t]*\r?\n(?:[ \t]*\r?\n)+")
        .expect("dangling marker pattern is valid")
});

const CONTINUATION_INDENT: &str = "    ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Opening or closing code fence, with its leading whitespace width.
    FenceBoundary { indent: usize },
    /// A bare list marker such as `-` or `12.`.
    MarkerOnly { marker: &'a str },
    /// A list marker followed by item text.
    ListItem,
    Plain,
}

impl LineKind<'_> {
    fn is_fence(&self) -> bool {
        matches!(self, LineKind::FenceBoundary { .. })
    }

    /// True when the line starts a new list item, bare or not.
    fn starts_item(&self) -> bool {
        matches!(self, LineKind::MarkerOnly { .. } | LineKind::ListItem)
    }
}

pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = FENCE_RE.captures(line) {
        let indent = caps.get(1).map(|m| m.as_str().chars().count()).unwrap_or(0);
        return LineKind::FenceBoundary { indent };
    }
    if let Some(marker) = MARKER_ONLY_RE.captures(line).and_then(|caps| caps.get(1)) {
        return LineKind::MarkerOnly {
            marker: marker.as_str(),
        };
    }
    if LIST_ITEM_RE.is_match(line) {
        return LineKind::ListItem;
    }
    LineKind::Plain
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FenceState {
    #[default]
    Outside,
    Inside {
        open_indent: usize,
    },
}

/// Tracks whether the scan is inside a fenced code block.
///
/// A closing fence must not be indented deeper than the fence that opened the
/// block; deeper fence-looking lines are code content.
#[derive(Debug, Default)]
pub struct FenceTracker {
    state: FenceState,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FenceState {
        self.state
    }

    pub fn is_inside(&self) -> bool {
        matches!(self.state, FenceState::Inside { .. })
    }

    /// Feed one classified line. Returns `true` when the line is part of a
    /// fenced block (including its boundaries) and must be kept verbatim.
    pub fn observe(&mut self, kind: &LineKind<'_>) -> bool {
        match (self.state, kind) {
            (FenceState::Outside, LineKind::FenceBoundary { indent }) => {
                self.state = FenceState::Inside {
                    open_indent: *indent,
                };
                true
            }
            (FenceState::Outside, _) => false,
            (FenceState::Inside { open_indent }, LineKind::FenceBoundary { indent }) => {
                if *indent <= open_indent {
                    self.state = FenceState::Outside;
                }
                true
            }
            (FenceState::Inside { .. }, _) => true,
        }
    }
}

/// Forward-only cursor over the lines of a document with lookahead.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a str> {
        self.lines.get(self.pos + n).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.lines.len());
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }
}

/// True when `line` may be pulled into the item above it.
fn is_item_content(line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    let kind = classify(line);
    !kind.starts_item() && !kind.is_fence()
}

/// Output lines grouped by whether they sit inside a code fence, so the
/// cleanup pass can skip code.
#[derive(Default)]
struct Segments {
    pieces: Vec<String>,
    current: Vec<String>,
    current_is_code: bool,
}

impl Segments {
    fn push(&mut self, line: String, is_code: bool) {
        if is_code != self.current_is_code && !self.current.is_empty() {
            self.flush();
        }
        self.current_is_code = is_code;
        self.current.push(line);
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let joined = self.current.join("\n");
        self.current.clear();
        if self.current_is_code {
            self.pieces.push(joined);
        } else {
            self.pieces
                .push(DANGLING_MARKER_RE.replace_all(&joined, "${1} ").into_owned());
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.pieces.join("\n")
    }
}

/// Rejoin list markers that were split from their text.
///
/// Lines inside fenced code blocks are never changed. Text without bare
/// markers is returned unchanged.
pub fn repair_markdown(text: &str) -> String {
    let mut cursor = LineCursor::new(text);
    let mut fences = FenceTracker::new();
    let mut out = Segments::default();
    let mut merged = 0usize;

    while let Some(line) = cursor.next() {
        let kind = classify(line);
        if fences.observe(&kind) {
            out.push(line.to_string(), true);
            continue;
        }

        let LineKind::MarkerOnly { .. } = kind else {
            out.push(line.to_string(), false);
            continue;
        };

        match cursor.peek() {
            Some(next) if is_item_content(next) => {
                out.push(format!("{} {}", line.trim_end(), next.trim()), false);
                cursor.advance(1);
                merged += 1;

                let mut absorbed = 0;
                while let Some(cont) = cursor.peek_nth(absorbed) {
                    if !is_item_content(cont) {
                        break;
                    }
                    out.push(format!("{CONTINUATION_INDENT}{cont}"), false);
                    absorbed += 1;
                }
                cursor.advance(absorbed);
            }
            _ => out.push(line.to_string(), false),
        }
    }

    if fences.is_inside() {
        debug!("markdown ended inside an unterminated code fence");
    }
    if merged > 0 {
        debug!(merged, "rejoined split list markers");
    }

    out.finish()
}

/// Repair `content` for display, falling back to the original text if the
/// repair step fails for any reason.
pub fn prepare_for_render(content: &str) -> Cow<'_, str> {
    match std::panic::catch_unwind(|| repair_markdown(content)) {
        Ok(repaired) if repaired == content => Cow::Borrowed(content),
        Ok(repaired) => Cow::Owned(repaired),
        Err(_) => {
            warn!("markdown repair failed; rendering content as received");
            Cow::Borrowed(content)
        }
    }
}
