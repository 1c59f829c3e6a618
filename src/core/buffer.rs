//! The editable document: lines plus a cursor, backed by tui-textarea.
//!
//! Every content-changing method returns `true` when the text actually
//! changed so the session can recompute the dirty flag and schedule a
//! preview render. Undo history is disabled; the editor has none.

use ratatui::style::Style;
use tui_textarea::{CursorMove, Input, TextArea};

/// Widget styling re-applied whenever the document is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferStyle {
    pub text: Style,
    pub cursor: Style,
    pub cursor_line: Style,
    pub line_number: Option<Style>,
    pub selection: Style,
    pub tab_length: u8,
}

pub struct TextBuffer {
    textarea: TextArea<'static>,
    style: Option<BufferStyle>,
    cursor_visible: bool,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl TextBuffer {
    /// Builds a buffer from raw file text. `\r\n` is normalized to `\n` and a
    /// trailing newline survives as a final empty line, so `text()` returns
    /// the normalized input unchanged.
    pub fn from_text(text: &str) -> Self {
        let mut textarea = TextArea::new(split_lines(text));
        textarea.set_max_histories(0);
        Self {
            textarea,
            style: None,
            cursor_visible: true,
        }
    }

    /// Replaces the whole document (load/new). The cursor returns to 0:0 and
    /// the widget styling is carried over.
    pub fn replace(&mut self, text: &str) {
        let mut textarea = TextArea::new(split_lines(text));
        textarea.set_max_histories(0);
        self.textarea = textarea;
        self.apply_style();
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn lines(&self) -> &[String] {
        self.textarea.lines()
    }

    pub fn line_count(&self) -> usize {
        self.textarea.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 1 && self.textarea.lines()[0].is_empty()
    }

    /// Cursor as 0-based (line, column); the column counts characters.
    pub fn cursor(&self) -> (usize, usize) {
        self.textarea.cursor()
    }

    /// Cursor as shown to the user, 1-based on both axes.
    pub fn cursor_display(&self) -> (usize, usize) {
        let (line, col) = self.textarea.cursor();
        (line + 1, col + 1)
    }

    pub fn word_count(&self) -> usize {
        self.textarea
            .lines()
            .iter()
            .map(|line| line.split_whitespace().count())
            .sum()
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    // ─── Mutations (return whether the text changed) ─────────────────────

    pub fn input(&mut self, input: impl Into<Input>) -> bool {
        self.textarea.input(input)
    }

    pub fn insert_str(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.textarea.insert_str(text.replace("\r\n", "\n"))
    }

    /// Cuts the selection into the widget's yank buffer.
    pub fn cut(&mut self) -> bool {
        self.textarea.cut()
    }

    // ─── Cursor and selection (never change the text) ────────────────────

    pub fn move_cursor(&mut self, movement: CursorMove) {
        self.textarea.move_cursor(movement);
    }

    /// Moves the cursor to (line, column), clamped to the document.
    pub fn jump_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        let line = line.min(max_line);
        let max_col = self.textarea.lines()[line].chars().count();
        let col = col.min(max_col);
        self.textarea.move_cursor(CursorMove::Jump(
            line.min(u16::MAX as usize) as u16,
            col.min(u16::MAX as usize) as u16,
        ));
    }

    pub fn jump_to_start(&mut self) {
        self.textarea.cancel_selection();
        self.textarea.move_cursor(CursorMove::Top);
        self.textarea.move_cursor(CursorMove::Head);
    }

    pub fn jump_to_end(&mut self) {
        self.textarea.cancel_selection();
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
    }

    pub fn select_all(&mut self) {
        self.textarea.select_all();
    }

    /// Scrolls the viewport by `rows`, dragging the cursor along when it
    /// would leave the view.
    pub fn scroll(&mut self, rows: i16) {
        self.textarea.scroll((rows, 0));
    }

    /// Returns the selected text, or `None` when nothing is selected.
    pub fn selected_text(&self) -> Option<String> {
        let ((sr, sc), (er, ec)) = self.textarea.selection_range()?;
        if (sr, sc) == (er, ec) {
            return None;
        }
        let lines = self.textarea.lines();
        let mut out = String::new();
        for row in sr..=er.min(lines.len().saturating_sub(1)) {
            let line = &lines[row];
            let start = if row == sr { sc } else { 0 };
            let end = if row == er { ec } else { line.chars().count() };
            out.extend(line.chars().skip(start).take(end.saturating_sub(start)));
            if row < er {
                out.push('\n');
            }
        }
        Some(out)
    }

    // ─── Presentation ────────────────────────────────────────────────────

    /// Columns taken by the line-number gutter: a leading space, the digits
    /// and a trailing space. Zero when line numbers are off.
    pub fn gutter_width(&self) -> u16 {
        match self.style.and_then(|s| s.line_number) {
            Some(_) => (self.line_count() as f64).log10() as u16 + 1 + 2,
            None => 0,
        }
    }

    /// Applies widget styling (colors, line numbers, tab width).
    pub fn set_style(&mut self, style: BufferStyle) {
        self.style = Some(style);
        self.apply_style();
    }

    /// Shows or hides the block cursor; an unfocused pane draws none.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        if self.cursor_visible != visible {
            self.cursor_visible = visible;
            self.apply_style();
        }
    }

    fn apply_style(&mut self) {
        let Some(style) = self.style else {
            return;
        };
        let ta = &mut self.textarea;
        ta.set_style(style.text);
        ta.set_cursor_line_style(style.cursor_line);
        match style.line_number {
            Some(ln) => ta.set_line_number_style(ln),
            None => ta.remove_line_number(),
        }
        ta.set_cursor_style(if self.cursor_visible {
            style.cursor
        } else {
            style.text
        });
        ta.set_selection_style(style.selection);
        ta.set_tab_length(style.tab_length.max(1));
        ta.set_hard_tab_indent(false);
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(String::from)
        .collect()
}
