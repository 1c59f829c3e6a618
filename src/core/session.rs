//! The editing session: one document, its preview and the flows that guard
//! it. Everything here runs on the event-loop thread; the terminal layer
//! only translates input into these calls and draws the result.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tui_textarea::{CursorMove, Input};

use super::buffer::{BufferStyle, TextBuffer};
use super::dirty::DirtyTracker;
use super::gate::{Decision, GateError, GateStep, PendingAction, PendingActionGate};
use super::io::FileIo;
use super::preview::{MarkdownRender, PreviewRenderer, PreviewSurface, RenderOutcome};
use super::scroll_sync;
use super::view::{Focus, Transition, ViewState, ViewStateMachine};
use crate::error::{EditorError, EditorResult};

const APP_NAME: &str = "MarkLn";
const APP_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub view: ViewState,
    pub render_delay: Duration,
    pub auto_preview: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            view: ViewState::Split,
            render_delay: Duration::from_millis(1000),
            auto_preview: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// How a user-facing operation ended. `AskDecision` and `AskSavePath` tell
/// the caller which prompt to open next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Cancelled,
    AskDecision,
    AskSavePath,
    Rejected,
    Failed,
}

pub struct Session {
    buffer: TextBuffer,
    dirty: DirtyTracker,
    preview: PreviewRenderer,
    view: ViewStateMachine,
    gate: PendingActionGate,
    file_path: Option<PathBuf>,
    io: Box<dyn FileIo>,
    notices: VecDeque<Notice>,
    quit_requested: bool,
}

impl Session {
    pub fn new(
        renderer: Box<dyn MarkdownRender>,
        io: Box<dyn FileIo>,
        options: SessionOptions,
    ) -> Self {
        let mut session = Self {
            buffer: TextBuffer::default(),
            dirty: DirtyTracker::default(),
            preview: PreviewRenderer::new(renderer, options.render_delay, options.auto_preview),
            view: ViewStateMachine::new(options.view),
            gate: PendingActionGate::new(),
            file_path: None,
            io,
            notices: VecDeque::new(),
            quit_requested: false,
        };
        session.preview.force_render("");
        session
    }

    /// Loads the file named on the command line. A path that does not exist
    /// yet starts an empty document that will be saved there.
    pub fn open_initial(&mut self, path: PathBuf) -> Outcome {
        match self.load(&path) {
            Ok(()) => Outcome::Done,
            Err(EditorError::NotFound(_)) => {
                tracing::info!(path = %path.display(), "starting new file");
                self.notify(NoticeLevel::Info, format!("New file: {}", display_name(&path)));
                self.file_path = Some(path);
                Outcome::Done
            }
            Err(err) => self.fail(err),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn view(&self) -> &ViewStateMachine {
        &self.view
    }

    pub fn gate(&self) -> &PendingActionGate {
        &self.gate
    }

    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    /// File name shown in the header, `Untitled` for a new document.
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Terminal window title, e.g. `MarkLn v1.2 :: notes.md *`.
    pub fn title(&self) -> String {
        let marker = if self.is_dirty() { " *" } else { "" };
        format!("{APP_NAME} v{APP_VERSION} :: {}{marker}", self.display_name())
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Routes a key to the editor. Ignored unless the editor holds focus.
    pub fn edit(&mut self, input: impl Into<Input>, now: Instant) -> bool {
        let input = input.into();
        self.mutate(now, |buf| buf.input(input))
    }

    pub fn insert_str(&mut self, text: &str, now: Instant) -> bool {
        self.mutate(now, |buf| buf.insert_str(text))
    }

    /// Cuts the selection; returns the removed text.
    pub fn cut_selection(&mut self, now: Instant) -> Option<String> {
        let selected = self.buffer.selected_text()?;
        self.mutate(now, TextBuffer::cut).then_some(selected)
    }

    fn mutate(&mut self, now: Instant, f: impl FnOnce(&mut TextBuffer) -> bool) -> bool {
        if !self.view.editor_focused() {
            return false;
        }
        let changed = f(&mut self.buffer);
        if changed {
            self.dirty.recompute(&self.buffer.text());
            self.preview.on_buffer_changed(now);
        }
        changed
    }

    pub fn move_cursor(&mut self, movement: CursorMove) {
        self.buffer.move_cursor(movement);
    }

    pub fn jump_to(&mut self, line: usize, col: usize) {
        self.buffer.jump_to(line, col);
    }

    pub fn jump_to_start(&mut self) {
        self.buffer.jump_to_start();
    }

    pub fn jump_to_end(&mut self) {
        self.buffer.jump_to_end();
    }

    pub fn select_all(&mut self) {
        self.buffer.select_all();
    }

    pub fn scroll_editor(&mut self, rows: i16) {
        self.buffer.scroll(rows);
    }

    pub fn set_buffer_style(&mut self, style: BufferStyle) {
        self.buffer.set_style(style);
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.buffer.set_cursor_visible(visible);
    }

    // ─── Preview and layout ──────────────────────────────────────────────

    /// Fires the debounce deadline if due.
    pub fn tick(&mut self, now: Instant) -> RenderOutcome {
        let visible = self.view.state().preview_visible();
        let buffer = &self.buffer;
        self.preview.tick(now, visible, || buffer.text())
    }

    pub fn toggle_view(&mut self) -> Transition {
        let transition = self.view.toggle();
        if transition.entered_preview_only() {
            self.preview.force_render(&self.buffer.text());
        }
        tracing::debug!(from = ?transition.from, to = ?transition.to, "view toggled");
        transition
    }

    pub fn set_focus(&mut self, pane: Focus) -> bool {
        self.view.set_focus(pane)
    }

    pub fn cycle_focus(&mut self) -> bool {
        self.view.cycle_focus()
    }

    pub fn sync_scroll(&mut self) -> u16 {
        scroll_sync::sync(&self.buffer, &mut self.preview, &mut self.view)
    }

    pub fn force_preview(&mut self) {
        self.preview.force_render(&self.buffer.text());
    }

    pub fn toggle_auto_preview(&mut self) -> bool {
        let enabled = self.preview.toggle_auto_preview(&self.buffer.text());
        let state = if enabled { "on" } else { "off" };
        self.notify(NoticeLevel::Info, format!("Auto preview {state}"));
        enabled
    }

    pub fn resize_preview(&mut self, width: u16, height: u16) {
        self.preview.resize(width, height);
    }

    /// Scroll access for preview navigation keys.
    pub fn preview_surface_mut(&mut self) -> &mut PreviewSurface {
        self.preview.surface_mut()
    }

    // ─── Destructive actions ─────────────────────────────────────────────

    /// Issues new/open/quit through the confirmation gate.
    pub fn request(&mut self, action: PendingAction) -> Outcome {
        tracing::debug!(%action, dirty = self.is_dirty(), "destructive action requested");
        match self.gate.issue(action, self.is_dirty()) {
            Ok(step) => self.run_step(step),
            Err(err) => self.reject(err),
        }
    }

    /// Answer from the Save / Don't Save / Cancel dialog.
    pub fn decide(&mut self, decision: Decision) -> Outcome {
        tracing::info!(?decision, "unsaved-changes decision");
        match self.gate.decide(decision, self.file_path.as_deref()) {
            Ok(step) => self.run_step(step),
            Err(err) => self.reject(err),
        }
    }

    /// Answer from the path chooser opened for a gated save. `None` cancels.
    pub fn save_path_chosen(&mut self, path: Option<PathBuf>) -> Outcome {
        match self.gate.save_path_chosen(path) {
            Ok(step) => self.run_step(step),
            Err(err) => self.reject(err),
        }
    }

    fn run_step(&mut self, step: GateStep) -> Outcome {
        match step {
            GateStep::Execute(action) => self.execute(action),
            GateStep::AskDecision => Outcome::AskDecision,
            GateStep::AskSavePath => Outcome::AskSavePath,
            GateStep::SaveThenExecute { path, then } => {
                if self.write_to(path) {
                    self.execute(then)
                } else {
                    tracing::warn!(action = %then, "save failed, pending action dropped");
                    Outcome::Failed
                }
            }
            GateStep::Cancelled => Outcome::Cancelled,
        }
    }

    fn execute(&mut self, action: PendingAction) -> Outcome {
        tracing::info!(%action, "executing");
        match action {
            PendingAction::New => {
                self.buffer.replace("");
                self.dirty.mark_clean("");
                self.file_path = None;
                self.preview.force_render("");
                self.preview.surface_mut().scroll_home();
                self.notify(NoticeLevel::Info, "New document");
                Outcome::Done
            }
            PendingAction::Open(path) => match self.load(&path) {
                Ok(()) => {
                    self.notify(NoticeLevel::Info, format!("Opened {}", display_name(&path)));
                    Outcome::Done
                }
                Err(err) => self.fail(err),
            },
            PendingAction::Quit => {
                self.quit_requested = true;
                Outcome::Done
            }
        }
    }

    /// Refuses with a notice when a destructive action is still waiting for
    /// the user. Returns `true` if refused.
    pub fn reject_if_busy(&mut self) -> bool {
        match self.gate.pending().cloned() {
            Some(pending) => {
                self.reject(GateError::Busy(pending));
                true
            }
            None => false,
        }
    }

    // ─── Saving ──────────────────────────────────────────────────────────

    /// Saves to the bound path; an untitled document needs a path first.
    pub fn save(&mut self) -> Outcome {
        match self.file_path.clone() {
            Some(path) => {
                if self.write_to(path) {
                    Outcome::Done
                } else {
                    Outcome::Failed
                }
            }
            None => Outcome::AskSavePath,
        }
    }

    /// Saves to `path` and binds the document to it.
    pub fn save_as(&mut self, path: PathBuf) -> Outcome {
        if self.write_to(path) {
            Outcome::Done
        } else {
            Outcome::Failed
        }
    }

    fn write_to(&mut self, path: PathBuf) -> bool {
        let text = self.buffer.text();
        match self.io.write(&path, &text) {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = text.len(), "saved");
                self.dirty.mark_clean(text);
                self.notify(NoticeLevel::Info, format!("Saved {}", display_name(&path)));
                self.file_path = Some(path);
                true
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    fn load(&mut self, path: &Path) -> EditorResult<()> {
        let text = self.io.read(path)?;
        self.buffer.replace(&text);
        self.dirty.mark_clean(self.buffer.text());
        self.file_path = Some(path.to_path_buf());
        self.preview.force_render(&self.buffer.text());
        self.preview.surface_mut().scroll_home();
        tracing::info!(path = %path.display(), lines = self.buffer.line_count(), "loaded");
        Ok(())
    }

    // ─── Notices ─────────────────────────────────────────────────────────

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn fail(&mut self, err: EditorError) -> Outcome {
        tracing::warn!(error = %err, "operation failed");
        self.notify(NoticeLevel::Error, err.to_string());
        Outcome::Failed
    }

    fn reject(&mut self, err: GateError) -> Outcome {
        tracing::warn!(error = %err, "gate rejected command");
        self.notify(NoticeLevel::Error, EditorError::from(err).to_string());
        Outcome::Rejected
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
