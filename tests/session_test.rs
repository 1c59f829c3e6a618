use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use markln::core::preview::PreviewSurface;
use markln::core::scroll_sync;
use markln::core::{
    Decision, FileIo, Focus, MarkdownRender, NoticeLevel, Outcome, PendingAction, RenderOutcome,
    RenderedTree, Session, SessionOptions, ViewState,
};
use markln::error::{EditorError, EditorResult};
use ratatui::text::{Line, Text};

// ─── Helpers ─────────────────────────────────────────────────────────────

/// In-memory file system shared with the test; paths in `denied` fail.
#[derive(Clone, Default)]
struct MemoryIo {
    files: Rc<RefCell<HashMap<PathBuf, String>>>,
    denied: Rc<RefCell<HashSet<PathBuf>>>,
}

impl MemoryIo {
    fn with_file(path: &str, text: &str) -> Self {
        let io = Self::default();
        io.files.borrow_mut().insert(PathBuf::from(path), text.to_string());
        io
    }

    fn get(&self, path: &str) -> Option<String> {
        self.files.borrow().get(Path::new(path)).cloned()
    }

    fn deny(&self, path: &str) {
        self.denied.borrow_mut().insert(PathBuf::from(path));
    }
}

impl FileIo for MemoryIo {
    fn read(&self, path: &Path) -> EditorResult<String> {
        if self.denied.borrow().contains(path) {
            return Err(EditorError::PermissionDenied(path.to_path_buf()));
        }
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, text: &str) -> EditorResult<()> {
        if self.denied.borrow().contains(path) {
            return Err(EditorError::PermissionDenied(path.to_path_buf()));
        }
        self.files.borrow_mut().insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}

/// One output line per input line; counts renders.
struct CountingRenderer {
    renders: Rc<Cell<usize>>,
}

impl MarkdownRender for CountingRenderer {
    fn render(&self, text: &str, _width: u16) -> RenderedTree {
        self.renders.set(self.renders.get() + 1);
        let lines: Vec<Line<'static>> = text.lines().map(|l| Line::from(l.to_string())).collect();
        RenderedTree {
            text: Text::from(lines),
        }
    }
}

const DELAY: Duration = Duration::from_millis(1000);

fn session_with(io: MemoryIo, options: SessionOptions) -> (Session, Rc<Cell<usize>>) {
    let renders = Rc::new(Cell::new(0));
    let renderer = CountingRenderer {
        renders: Rc::clone(&renders),
    };
    (Session::new(Box::new(renderer), Box::new(io), options), renders)
}

fn session(io: MemoryIo) -> (Session, Rc<Cell<usize>>) {
    session_with(
        io,
        SessionOptions {
            render_delay: DELAY,
            ..SessionOptions::default()
        },
    )
}

fn type_text(session: &mut Session, text: &str, now: Instant) {
    for ch in text.chars() {
        session.edit(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE), now);
    }
}

fn backspace(session: &mut Session, now: Instant) {
    session.edit(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE), now);
}

// ═══════════════════════════════════════════════════════════════════════
// A. Dirty tracking
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn dirty_iff_text_differs_from_snapshot() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io);
    s.open_initial(PathBuf::from("a.md"));
    let now = Instant::now();
    assert!(!s.is_dirty());

    s.jump_to_end();
    type_text(&mut s, "d", now);
    assert!(s.is_dirty());

    // Undoing the edit by hand returns to the snapshot
    backspace(&mut s, now);
    assert_eq!(s.text(), "abc");
    assert!(!s.is_dirty());
}

#[test]
fn save_records_new_snapshot() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io.clone());
    s.open_initial(PathBuf::from("a.md"));
    let now = Instant::now();
    s.jump_to_end();
    type_text(&mut s, "!", now);

    assert_eq!(s.save(), Outcome::Done);
    assert!(!s.is_dirty());
    assert_eq!(io.get("a.md").as_deref(), Some("abc!"));

    backspace(&mut s, now);
    assert!(s.is_dirty(), "the old snapshot no longer applies");
}

#[test]
fn failed_save_keeps_dirty_and_reports() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io.clone());
    s.open_initial(PathBuf::from("a.md"));
    type_text(&mut s, "x", Instant::now());
    io.deny("a.md");

    assert_eq!(s.save(), Outcome::Failed);
    assert!(s.is_dirty());
    let notices = s.take_notices();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Error && n.message.contains("Permission denied")));
}

#[test]
fn missing_initial_file_starts_empty_bound_document() {
    let (mut s, _) = session(MemoryIo::default());
    assert_eq!(s.open_initial(PathBuf::from("new.md")), Outcome::Done);
    assert_eq!(s.text(), "");
    assert_eq!(s.file_path(), Some(Path::new("new.md")));
    assert!(!s.is_dirty());
    assert_eq!(s.title(), "MarkLn v1.2 :: new.md");
}

#[test]
fn title_marks_dirty_documents() {
    let (mut s, _) = session(MemoryIo::default());
    assert_eq!(s.title(), "MarkLn v1.2 :: Untitled");
    type_text(&mut s, "x", Instant::now());
    assert_eq!(s.title(), "MarkLn v1.2 :: Untitled *");
}

// ═══════════════════════════════════════════════════════════════════════
// B. View toggling
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn toggle_follows_fixed_cyclic_order() {
    let (mut s, _) = session(MemoryIo::default());
    assert_eq!(s.view().state(), ViewState::Split);
    let order: Vec<ViewState> = (0..3).map(|_| s.toggle_view().to).collect();
    assert_eq!(
        order,
        vec![ViewState::EditorOnly, ViewState::PreviewOnly, ViewState::Split]
    );
}

#[test]
fn entering_preview_only_forces_render_of_latest_text() {
    let (mut s, renders) = session(MemoryIo::default());
    type_text(&mut s, "fresh", Instant::now());
    let before = renders.get();
    s.toggle_view();
    s.toggle_view();
    assert_eq!(s.view().state(), ViewState::PreviewOnly);
    assert_eq!(renders.get(), before + 1);
    assert_eq!(s.preview().surface().source(), "fresh");
}

#[test]
fn hidden_pane_cannot_take_focus_or_edits() {
    let (mut s, _) = session(MemoryIo::default());
    s.toggle_view(); // EditorOnly
    assert!(!s.set_focus(Focus::Preview));
    s.toggle_view(); // PreviewOnly
    assert!(!s.set_focus(Focus::Editor));
    assert!(!s.edit(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE), Instant::now()));
    assert_eq!(s.text(), "");
}

// ═══════════════════════════════════════════════════════════════════════
// C. Debounced preview
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn burst_of_edits_renders_once_with_final_text() {
    let (mut s, renders) = session(MemoryIo::default());
    let start = Instant::now();
    let baseline = renders.get();

    for (i, ch) in "hello".chars().enumerate() {
        let at = start + Duration::from_millis(100 * i as u64);
        s.edit(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE), at);
        assert_eq!(s.tick(at), RenderOutcome::Idle);
    }

    assert_eq!(s.tick(start + DELAY), RenderOutcome::Applied);
    assert_eq!(renders.get(), baseline + 1);
    assert_eq!(s.preview().surface().source(), "hello");
    assert_eq!(s.tick(start + DELAY * 3), RenderOutcome::Idle);
}

#[test]
fn deadline_in_editor_only_is_suppressed() {
    let (mut s, renders) = session(MemoryIo::default());
    s.toggle_view(); // EditorOnly
    let start = Instant::now();
    let baseline = renders.get();
    type_text(&mut s, "x", start);
    assert_eq!(s.tick(start + DELAY), RenderOutcome::Suppressed);
    assert_eq!(renders.get(), baseline);
}

#[test]
fn auto_preview_off_schedules_nothing_but_force_still_renders() {
    let (mut s, renders) = session_with(
        MemoryIo::default(),
        SessionOptions {
            render_delay: DELAY,
            auto_preview: false,
            ..SessionOptions::default()
        },
    );
    let start = Instant::now();
    type_text(&mut s, "manual", start);
    assert!(!s.preview().is_pending());
    assert_eq!(s.tick(start + DELAY * 2), RenderOutcome::Idle);

    let before = renders.get();
    s.force_preview();
    assert_eq!(renders.get(), before + 1);
    assert_eq!(s.preview().surface().source(), "manual");
}

#[test]
fn turning_auto_preview_back_on_renders_current_text() {
    let (mut s, _) = session(MemoryIo::default());
    assert!(!s.toggle_auto_preview());
    type_text(&mut s, "later", Instant::now());
    assert!(s.toggle_auto_preview());
    assert_eq!(s.preview().surface().source(), "later");
}

// ═══════════════════════════════════════════════════════════════════════
// D. Pending action gate
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn quit_then_cancel_leaves_everything_unchanged() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io);
    s.open_initial(PathBuf::from("a.md"));
    type_text(&mut s, "x", Instant::now());
    let (text, dirty, view) = (s.text(), s.is_dirty(), s.view().state());

    assert_eq!(s.request(PendingAction::Quit), Outcome::AskDecision);
    assert_eq!(s.decide(Decision::Cancel), Outcome::Cancelled);

    assert_eq!(s.text(), text);
    assert_eq!(s.is_dirty(), dirty);
    assert_eq!(s.view().state(), view);
    assert!(s.gate().is_idle());
    assert!(!s.should_quit());
}

#[test]
fn new_then_discard_yields_empty_clean_document() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io.clone());
    s.open_initial(PathBuf::from("a.md"));
    type_text(&mut s, "x", Instant::now());

    assert_eq!(s.request(PendingAction::New), Outcome::AskDecision);
    assert_eq!(s.decide(Decision::Discard), Outcome::Done);

    assert_eq!(s.text(), "");
    assert!(!s.is_dirty());
    assert!(s.gate().is_idle());
    assert!(s.file_path().is_none());
    assert_eq!(io.get("a.md").as_deref(), Some("abc"));
}

#[test]
fn clean_document_skips_the_prompt() {
    let io = MemoryIo::with_file("b.md", "other");
    let (mut s, _) = session(io);
    assert_eq!(s.request(PendingAction::Open(PathBuf::from("b.md"))), Outcome::Done);
    assert_eq!(s.text(), "other");
}

#[test]
fn save_decision_writes_bound_file_then_opens() {
    let io = MemoryIo::with_file("a.md", "abc");
    io.files.borrow_mut().insert(PathBuf::from("b.md"), "second".into());
    let (mut s, _) = session(io.clone());
    s.open_initial(PathBuf::from("a.md"));
    type_text(&mut s, "x", Instant::now());

    s.request(PendingAction::Open(PathBuf::from("b.md")));
    assert_eq!(s.decide(Decision::Save), Outcome::Done);
    assert_eq!(io.get("a.md").as_deref(), Some("xabc"));
    assert_eq!(s.text(), "second");
    assert_eq!(s.file_path(), Some(Path::new("b.md")));
}

#[test]
fn save_decision_on_untitled_asks_for_path() {
    let io = MemoryIo::default();
    let (mut s, _) = session(io.clone());
    type_text(&mut s, "draft", Instant::now());

    s.request(PendingAction::Quit);
    assert_eq!(s.decide(Decision::Save), Outcome::AskSavePath);
    assert_eq!(s.save_path_chosen(Some(PathBuf::from("draft.md"))), Outcome::Done);
    assert_eq!(io.get("draft.md").as_deref(), Some("draft"));
    assert!(s.should_quit());
}

#[test]
fn cancelling_the_save_path_drops_the_action() {
    let (mut s, _) = session(MemoryIo::default());
    type_text(&mut s, "draft", Instant::now());
    s.request(PendingAction::New);
    s.decide(Decision::Save);
    assert_eq!(s.save_path_chosen(None), Outcome::Cancelled);
    assert_eq!(s.text(), "draft");
    assert!(s.gate().is_idle());
}

#[test]
fn failed_save_aborts_the_pending_action() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io.clone());
    s.open_initial(PathBuf::from("a.md"));
    type_text(&mut s, "x", Instant::now());
    io.deny("a.md");

    s.request(PendingAction::Quit);
    assert_eq!(s.decide(Decision::Save), Outcome::Failed);
    assert!(!s.should_quit());
    assert!(s.is_dirty());
    assert!(s.gate().is_idle());
}

#[test]
fn second_destructive_command_is_rejected() {
    let (mut s, _) = session(MemoryIo::default());
    type_text(&mut s, "x", Instant::now());
    assert_eq!(s.request(PendingAction::Quit), Outcome::AskDecision);
    assert_eq!(s.request(PendingAction::New), Outcome::Rejected);
    assert_eq!(s.gate().pending(), Some(&PendingAction::Quit));
    assert!(s
        .take_notices()
        .iter()
        .any(|n| n.level == NoticeLevel::Error && n.message.contains("quit")));
}

#[test]
fn failed_open_leaves_buffer_untouched() {
    let io = MemoryIo::with_file("a.md", "abc");
    let (mut s, _) = session(io);
    s.open_initial(PathBuf::from("a.md"));
    assert_eq!(s.request(PendingAction::Open(PathBuf::from("missing.md"))), Outcome::Failed);
    assert_eq!(s.text(), "abc");
    assert_eq!(s.file_path(), Some(Path::new("a.md")));
}

// ═══════════════════════════════════════════════════════════════════════
// E. Scroll sync
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn proportional_target_offset() {
    assert_eq!(scroll_sync::target_offset(50, 100, 1000, 100), 450);
    assert_eq!(scroll_sync::target_offset(0, 100, 1000, 100), 0);
}

#[test]
fn sync_scrolls_preview_and_keeps_editor_focus() {
    let text: String = (0..100).map(|i| format!("line {i}\n")).collect();
    let io = MemoryIo::with_file("long.md", &text);
    let (mut s, _) = session(io);
    s.open_initial(PathBuf::from("long.md"));
    s.resize_preview(80, 20);
    s.jump_to(50, 0);

    let offset = s.sync_scroll();
    let surface: &PreviewSurface = s.preview().surface();
    assert_eq!(surface.scroll_offset(), offset);
    assert!(offset > 0);
    assert!(s.view().editor_focused());
}
