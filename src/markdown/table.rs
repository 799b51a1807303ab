use crate::ui::theme::Theme;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

type Cell = Vec<Span<'static>>;

/// Buffers a table's cells until the table ends, then lays it out with
/// columns padded to their widest cell.
#[derive(Default)]
pub(super) struct TableRenderer {
    header: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
    current_row: Vec<Cell>,
    current_cell: Cell,
    in_header: bool,
}

fn cell_width(cell: &Cell) -> usize {
    cell.iter().map(|s| s.content.width()).sum()
}

impl TableRenderer {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn start_header(&mut self) {
        self.in_header = true;
        self.current_row.clear();
    }

    pub(super) fn end_header(&mut self) {
        self.header = std::mem::take(&mut self.current_row);
        self.in_header = false;
    }

    pub(super) fn start_row(&mut self) {
        self.current_row.clear();
    }

    pub(super) fn end_row(&mut self) {
        let row = std::mem::take(&mut self.current_row);
        self.rows.push(row);
    }

    pub(super) fn start_cell(&mut self) {
        self.current_cell.clear();
    }

    pub(super) fn end_cell(&mut self) {
        let cell = std::mem::take(&mut self.current_cell);
        self.current_row.push(cell);
    }

    pub(super) fn add_span(&mut self, span: Span<'static>) {
        self.current_cell.push(span);
    }

    pub(super) fn is_in_header(&self) -> bool {
        self.in_header
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);
        (0..columns)
            .map(|col| {
                std::iter::once(&self.header)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(col))
                    .map(cell_width)
                    .max()
                    .unwrap_or(0)
                    .max(1)
            })
            .collect()
    }

    fn row_line(row: &[Cell], widths: &[usize], theme: &Theme) -> Line<'static> {
        let border = theme.md_table_border;
        let mut spans = vec![Span::styled("│ ", border)];
        for (col, width) in widths.iter().enumerate() {
            let used = row.get(col).map(cell_width).unwrap_or(0);
            if let Some(cell) = row.get(col) {
                spans.extend(cell.iter().cloned());
            }
            spans.push(Span::raw(" ".repeat(width.saturating_sub(used))));
            let sep = if col + 1 == widths.len() { " │" } else { " │ " };
            spans.push(Span::styled(sep, border));
        }
        Line::from(spans)
    }

    fn rule_line(widths: &[usize], left: &str, mid: &str, right: &str, theme: &Theme) -> Line<'static> {
        let body = widths
            .iter()
            .map(|w| "─".repeat(w + 2))
            .collect::<Vec<_>>()
            .join(mid);
        Line::from(Span::styled(format!("{left}{body}{right}"), theme.md_table_border))
    }

    pub(super) fn finalize(self, theme: &Theme) -> Vec<Line<'static>> {
        let widths = self.column_widths();
        if widths.is_empty() {
            return Vec::new();
        }

        let mut lines = vec![Self::rule_line(&widths, "┌", "┬", "┐", theme)];
        if !self.header.is_empty() {
            lines.push(Self::row_line(&self.header, &widths, theme));
            lines.push(Self::rule_line(&widths, "├", "┼", "┤", theme));
        }
        for row in &self.rows {
            lines.push(Self::row_line(row, &widths, theme));
        }
        lines.push(Self::rule_line(&widths, "└", "┴", "┘", theme));
        lines
    }
}
