use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::components::{dialog, editor, header, preview, status};
use crate::core::{
    Decision, Focus, FsIo, NoticeLevel, Outcome, PendingAction, RenderOutcome, Session,
    SessionOptions, ViewState,
};
use crate::markdown::TerminalRenderer;
use crate::theme::Palette;

use dialogs::{
    DecisionDialog, DialogResult, ListPicker, Modal, OptionItem, PathPrompt, PathPurpose,
    PickerKind, MARKDOWN_TAGS, OPTION_ITEMS,
};
use keymap::{Command, Scope};

pub mod dialogs;
pub mod keymap;

/// How long status bar messages stay visible before auto-clearing.
const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Lines to scroll per mouse wheel tick.
const SCROLL_LINES: u16 = 3;

const STARTUP_HINT: &str = "F1: help | Ctrl+T: view | Ctrl+S: save | Ctrl+Q: quit";

/// Everything the main loop feeds the app. Ticks carry their own timestamp
/// so debounce deadlines can be driven deterministically in tests.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Input(Event),
    Tick(Instant),
}

pub struct App {
    pub session: Session,
    palette: Palette,
    theme_name: String,

    // --- Modal prompt, drawn over everything ---
    modal: Option<Modal>,

    // --- Status bar ---
    pub status_message: String,
    pub status_is_error: bool,
    pub status_time: Option<Instant>,

    // --- Internal tracking ---
    /// Pane rects from the last render (used for mouse hit-testing).
    editor_area: Rect,
    preview_area: Rect,
    /// Tracks tui-textarea's scroll position for mouse click → buffer position math.
    editor_scroll_top: u16,
}

impl App {
    pub fn new(mut session: Session, palette: Palette, theme_name: impl Into<String>) -> Self {
        session.set_buffer_style(editor::buffer_style(&palette));
        let editor_focused = session.view().editor_focused();
        session.set_cursor_visible(editor_focused);

        let mut app = Self {
            session,
            palette,
            theme_name: theme_name.into(),
            modal: None,
            status_message: String::new(),
            status_is_error: false,
            status_time: None,
            editor_area: Rect::default(),
            preview_area: Rect::default(),
            editor_scroll_top: 0,
        };
        app.set_status(STARTUP_HINT);
        app.pump_notices();
        app
    }

    /// Builds the session against the real file system and opens `file` if
    /// one was named.
    pub fn launch(
        file: Option<PathBuf>,
        options: SessionOptions,
        palette: Palette,
        theme_name: impl Into<String>,
    ) -> Self {
        let renderer = TerminalRenderer::new(palette.clone());
        let mut session = Session::new(Box::new(renderer), Box::new(FsIo), options);
        if let Some(path) = file {
            session.open_initial(path);
        }
        Self::new(session, palette, theme_name)
    }

    pub fn should_quit(&self) -> bool {
        self.session.should_quit()
    }

    pub fn title(&self) -> String {
        self.session.title()
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(event) => self.handle_event(event, Instant::now()),
            AppEvent::Tick(now) => self.tick(now),
        }
        self.pump_notices();
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            // Bracketed paste: terminal sends entire clipboard as one event
            Event::Paste(text) => self.handle_paste(&text, now),
            _ => {}
        }
    }

    /// Fires due preview renders and expires the status message.
    fn tick(&mut self, now: Instant) {
        if self.session.tick(now) == RenderOutcome::Applied {
            tracing::trace!("debounced preview render applied");
        }
        if let Some(time) = self.status_time {
            if now.saturating_duration_since(time) >= STATUS_DURATION {
                self.status_message.clear();
                self.status_is_error = false;
                self.status_time = None;
            }
        }
    }

    /// Moves session notices into the status bar; the newest one wins.
    fn pump_notices(&mut self) {
        if let Some(notice) = self.session.take_notices().pop() {
            self.status_message = notice.message;
            self.status_is_error = notice.level == NoticeLevel::Error;
            self.status_time = Some(Instant::now());
        }
    }

    /// Shows a temporary message in the status bar.
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = msg.to_string();
        self.status_is_error = false;
        self.status_time = Some(Instant::now());
    }

    /// Keeps the cursor drawn only in a focused, visible editor.
    fn sync_cursor_visibility(&mut self) {
        let visible = self.session.view().editor_focused();
        self.session.set_cursor_visible(visible);
    }
}

mod clipboard;
mod input;
mod render;
