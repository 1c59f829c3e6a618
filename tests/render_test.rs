use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use markln::app::{App, AppEvent};
use markln::core::SessionOptions;
use markln::theme::Palette;
use ratatui::{backend::TestBackend, buffer::Buffer, style::Color, Terminal};
use tempfile::TempDir;

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Creates an App with a named file inside a TempDir.
fn app_with_named_file(content: &str, filename: &str) -> (App, TempDir) {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join(filename);
    std::fs::write(&file_path, content).unwrap();
    let app = App::launch(Some(file_path), SessionOptions::default(), Palette::default(), "default");
    (app, dir)
}

fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    app.dispatch(AppEvent::Input(Event::Key(KeyEvent::new(code, modifiers))));
}

/// Renders the app into a TestBackend buffer and returns the buffer for inspection.
fn render_app(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    terminal.backend().buffer().clone()
}

/// Extracts the text content of a single row from the buffer (stripping trailing spaces).
fn buffer_line_text(buf: &Buffer, row: u16) -> String {
    let width = buf.area.width;
    let mut text = String::new();
    for col in 0..width {
        if let Some(cell) = buf.cell((col, row)) {
            text.push_str(cell.symbol());
        }
    }
    text.trim_end().to_string()
}

/// Returns the foreground color of a specific cell.
fn cell_fg(buf: &Buffer, x: u16, y: u16) -> Color {
    buf.cell((x, y)).unwrap().fg
}

/// Returns the background color of a specific cell.
fn cell_bg(buf: &Buffer, x: u16, y: u16) -> Color {
    buf.cell((x, y)).unwrap().bg
}

/// Searches the entire buffer for a substring and returns true if found.
fn buffer_contains(buf: &Buffer, needle: &str) -> bool {
    (0..buf.area.height).any(|row| buffer_line_text(buf, row).contains(needle))
}

/// Column where `needle` starts in `row`, counted in cells.
fn find_col(buf: &Buffer, row: u16, needle: &str) -> Option<u16> {
    let line = buffer_line_text(buf, row);
    let byte = line.find(needle)?;
    Some(line[..byte].chars().count() as u16)
}

// ═══════════════════════════════════════════════════════════════════════
// A. Header
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn header_shows_filename() {
    let (mut app, _dir) = app_with_named_file("hello", "myfile.md");
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 0).contains("myfile.md"));
}

#[test]
fn header_shows_modified_indicator_when_modified() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 0).contains("test.md \u{2022}"));
}

#[test]
fn header_no_modified_indicator_when_clean() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    let buf = render_app(&mut app, 80, 20);
    assert!(!buffer_line_text(&buf, 0).contains('\u{2022}'));
}

#[test]
fn header_highlights_active_layout_tab() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    let palette = Palette::default();

    let buf = render_app(&mut app, 80, 20);
    let split = find_col(&buf, 0, "SPLIT").unwrap();
    let editor = find_col(&buf, 0, "EDITOR").unwrap();
    assert_eq!(cell_bg(&buf, split, 0), palette.active_tab);
    assert_ne!(cell_bg(&buf, editor, 0), palette.active_tab);

    press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 80, 20);
    assert_eq!(cell_bg(&buf, editor, 0), palette.active_tab);
}

#[test]
fn untitled_document_is_named_in_header() {
    let mut app = App::launch(None, SessionOptions::default(), Palette::default(), "default");
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 0).contains("Untitled"));
}

// ═══════════════════════════════════════════════════════════════════════
// B. Panes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn split_shows_source_and_rendered_markdown_side_by_side() {
    let (mut app, _dir) = app_with_named_file("# Title\n\nsome **bold** text", "test.md");
    let buf = render_app(&mut app, 80, 20);
    // Editor keeps the markup, preview drops it
    assert!(buffer_contains(&buf, "# Title"));
    assert!(buffer_contains(&buf, "some **bold** text"));
    assert!(buffer_contains(&buf, "some bold text"));
    // Pane separator
    assert!(buffer_line_text(&buf, 3).contains('\u{2502}'));
}

#[test]
fn editor_shows_line_numbers() {
    let (mut app, _dir) = app_with_named_file("first\nsecond", "test.md");
    press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 2).starts_with(" 1 first"));
    assert!(buffer_line_text(&buf, 3).starts_with(" 2 second"));
    assert_eq!(cell_fg(&buf, 1, 2), Palette::default().line_number);
}

#[test]
fn preview_only_renders_markdown_not_raw_text() {
    let (mut app, _dir) = app_with_named_file("some **bold** text", "test.md");
    press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
    press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_contains(&buf, "some bold text"));
    assert!(!buffer_contains(&buf, "**bold**"));
}

#[test]
fn preview_shows_latest_text_only_after_deadline() {
    let (mut app, _dir) = app_with_named_file("", "test.md");
    for ch in "later".chars() {
        press(&mut app, KeyCode::Char(ch), KeyModifiers::NONE);
    }
    let buf = render_app(&mut app, 80, 20);
    // Only the editor pane shows it so far
    let hits = (0..20).filter(|r| buffer_line_text(&buf, *r).contains("later")).count();
    assert_eq!(hits, 1);

    app.dispatch(AppEvent::Tick(Instant::now() + Duration::from_secs(5)));
    let buf = render_app(&mut app, 80, 20);
    let line = buffer_line_text(&buf, 2);
    assert_eq!(line.matches("later").count(), 2);
}

#[test]
fn narrow_preview_wraps_to_pane_width() {
    let words = "word ".repeat(30);
    let (mut app, _dir) = app_with_named_file(&words, "test.md");
    press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
    press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 40, 20);
    assert!(buffer_line_text(&buf, 2).contains("word"));
    assert!(buffer_line_text(&buf, 3).contains("word"));
}

// ═══════════════════════════════════════════════════════════════════════
// C. Status bar
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn status_bar_shows_cursor_position() {
    let (mut app, _dir) = app_with_named_file("hello\nworld", "test.md");
    press(&mut app, KeyCode::Down, KeyModifiers::NONE);
    press(&mut app, KeyCode::Right, KeyModifiers::NONE);
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 19).contains("Ln 2, Col 2"));
}

#[test]
fn status_bar_shows_word_count_and_save_status() {
    let (mut app, _dir) = app_with_named_file("one two three", "test.md");
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 19).contains("3 words | Saved"));

    press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_line_text(&buf, 19).contains("Modified"));
}

#[test]
fn status_bar_flags_manual_preview() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    press(&mut app, KeyCode::F(2), KeyModifiers::NONE);
    for _ in 0..3 {
        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
    }
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    let buf = render_app(&mut app, 120, 20);
    assert!(buffer_line_text(&buf, 19).contains("MANUAL"));
}

#[test]
fn error_notice_uses_error_color() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
    press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
    // Second destructive command while the dialog is up
    press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 100, 20);
    let col = find_col(&buf, 19, "Finish").unwrap();
    assert_eq!(cell_fg(&buf, col, 19), Palette::default().error);
}

// ═══════════════════════════════════════════════════════════════════════
// D. Modals
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn help_modal_lists_key_table() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    press(&mut app, KeyCode::F(1), KeyModifiers::NONE);
    let buf = render_app(&mut app, 100, 40);
    assert!(buffer_contains(&buf, "Keybindings"));
    assert!(buffer_contains(&buf, "Ctrl+Shift+S / Alt+S"));
    assert!(buffer_contains(&buf, "Sync preview to cursor"));
}

#[test]
fn unsaved_changes_dialog_shows_three_choices() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
    press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 80, 20);
    assert!(buffer_contains(&buf, "Save changes to test.md?"));
    assert!(buffer_contains(&buf, "Save"));
    assert!(buffer_contains(&buf, "Don't Save"));
    assert!(buffer_contains(&buf, "Cancel"));
}

#[test]
fn tag_picker_lists_snippets() {
    let (mut app, _dir) = app_with_named_file("hello", "test.md");
    press(&mut app, KeyCode::Char('g'), KeyModifiers::CONTROL);
    let buf = render_app(&mut app, 80, 30);
    assert!(buffer_contains(&buf, "Markdown tags"));
    assert!(buffer_contains(&buf, "Header 1"));
    assert!(buffer_contains(&buf, "Task List"));
}

// ═══════════════════════════════════════════════════════════════════════
// E. Flicker Regression
// ═══════════════════════════════════════════════════════════════════════

/// Backend wrapper that counts how many cells are written per draw() call.
/// Used to detect unnecessary full repaints (flicker).
struct TrackingBackend {
    inner: TestBackend,
    last_draw_count: usize,
}

impl TrackingBackend {
    fn new(width: u16, height: u16) -> Self {
        Self {
            inner: TestBackend::new(width, height),
            last_draw_count: 0,
        }
    }
}

impl ratatui::backend::Backend for TrackingBackend {
    fn draw<'a, I>(&mut self, content: I) -> std::io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a ratatui::buffer::Cell)>,
    {
        let cells: Vec<_> = content.collect();
        self.last_draw_count = cells.len();
        self.inner.draw(cells.into_iter())
    }

    fn hide_cursor(&mut self) -> std::io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> std::io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> std::io::Result<ratatui::layout::Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<ratatui::layout::Position>>(
        &mut self,
        position: P,
    ) -> std::io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> std::io::Result<()> {
        self.inner.clear()
    }

    fn size(&self) -> std::io::Result<ratatui::layout::Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> std::io::Result<ratatui::backend::WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[test]
fn render_frame_idle_writes_zero_cells() {
    // Regression test for flickering. ratatui diffs each frame against
    // the previous one and only writes changed cells. On an idle frame
    // (no state changes), the diff should be empty: 0 cells written.
    //
    // If render_frame() ever calls terminal.resize() or terminal.clear(),
    // the diff baseline is wiped and ALL cells get rewritten every frame,
    // visible as flickering. This test catches that: it would see
    // ~1920 cells written instead of 0.
    let (mut app, _dir) = app_with_named_file("hello world", "test.md");
    let mut terminal = Terminal::new(TrackingBackend::new(80, 24)).unwrap();
    let now = Instant::now();

    // Frame 1: initial draw, all cells are new
    app.render_frame(&mut terminal, now).unwrap();
    assert!(
        terminal.backend().last_draw_count > 0,
        "First frame should write cells",
    );

    // Frame 2: no state changes, diff should be empty
    app.render_frame(&mut terminal, now).unwrap();
    assert_eq!(
        terminal.backend().last_draw_count,
        0,
        "Idle frame wrote {} cells instead of 0; resize/clear is causing full repaint (flicker)",
        terminal.backend().last_draw_count
    );
}
