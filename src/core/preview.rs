//! Debounced preview pipeline.
//!
//! Buffer mutations call `on_buffer_changed`, which arms a single deadline.
//! `tick` fires it and renders whatever the buffer holds at that moment, but
//! only applies the result while the preview pane is visible. `force_render`
//! bypasses both the timer and the auto-preview flag.

use std::time::{Duration, Instant};

use ratatui::text::Text;

use super::debounce::Debouncer;

/// Width used before the first layout pass reports the real pane size.
const DEFAULT_WIDTH: u16 = 80;

/// Output of the render collaborator: styled lines ready for a paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTree {
    pub text: Text<'static>,
}

impl RenderedTree {
    pub fn height(&self) -> usize {
        self.text.lines.len()
    }
}

/// Converts markdown source into a render tree for a given wrap width.
/// Pure and infallible; malformed input renders best-effort.
pub trait MarkdownRender {
    fn render(&self, text: &str, width: u16) -> RenderedTree;
}

/// What `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No deadline was due.
    Idle,
    /// The deadline fired and the preview now shows the latest text.
    Applied,
    /// The deadline fired while the preview was hidden; nothing was applied.
    Suppressed,
}

/// The displayed preview: the last applied tree plus scroll position.
#[derive(Debug, Clone)]
pub struct PreviewSurface {
    tree: RenderedTree,
    source: String,
    width: u16,
    scroll_offset: u16,
    viewport_height: u16,
    generation: u64,
}

impl Default for PreviewSurface {
    fn default() -> Self {
        Self {
            tree: RenderedTree::default(),
            source: String::new(),
            width: DEFAULT_WIDTH,
            scroll_offset: 0,
            viewport_height: 0,
            generation: 0,
        }
    }
}

impl PreviewSurface {
    pub fn tree(&self) -> &RenderedTree {
        &self.tree
    }

    /// The text the current tree was rendered from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> u16 {
        self.viewport_height
    }

    /// Number of applied renders so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn content_height(&self) -> u16 {
        self.tree.height().min(u16::MAX as usize) as u16
    }

    fn max_scroll(&self) -> u16 {
        self.content_height().saturating_sub(self.viewport_height)
    }

    fn apply(&mut self, source: String, tree: RenderedTree) {
        self.source = source;
        self.tree = tree;
        self.generation += 1;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn scroll_to(&mut self, offset: u16) {
        self.scroll_offset = offset.min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(self.max_scroll());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.saturating_sub(2).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.saturating_sub(2).max(1));
    }

    pub fn scroll_home(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_end(&mut self) {
        self.scroll_offset = self.max_scroll();
    }
}

pub struct PreviewRenderer {
    renderer: Box<dyn MarkdownRender>,
    debounce: Debouncer,
    auto_preview: bool,
    surface: PreviewSurface,
}

impl PreviewRenderer {
    pub fn new(renderer: Box<dyn MarkdownRender>, delay: Duration, auto_preview: bool) -> Self {
        Self {
            renderer,
            debounce: Debouncer::new(delay),
            auto_preview,
            surface: PreviewSurface::default(),
        }
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut PreviewSurface {
        &mut self.surface
    }

    pub fn auto_preview(&self) -> bool {
        self.auto_preview
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn delay(&self) -> Duration {
        self.debounce.delay()
    }

    /// Called after every content mutation. Arms the deadline when auto
    /// preview is on and none is pending. Returns whether one was armed.
    pub fn on_buffer_changed(&mut self, now: Instant) -> bool {
        if !self.auto_preview {
            return false;
        }
        let armed = self.debounce.schedule_once(now);
        if armed {
            tracing::debug!(delay_ms = self.debounce.delay().as_millis() as u64, "preview render scheduled");
        }
        armed
    }

    /// Fires a due deadline. `text` is only called when the render actually
    /// happens, so it always sees the latest buffer content.
    pub fn tick(
        &mut self,
        now: Instant,
        preview_visible: bool,
        text: impl FnOnce() -> String,
    ) -> RenderOutcome {
        if !self.debounce.poll(now) {
            return RenderOutcome::Idle;
        }
        if !preview_visible {
            tracing::debug!("preview render suppressed, pane hidden");
            return RenderOutcome::Suppressed;
        }
        self.render_now(text());
        tracing::debug!(generation = self.surface.generation, "debounced preview render applied");
        RenderOutcome::Applied
    }

    /// Renders and applies `text` immediately. A pending deadline stays armed.
    pub fn force_render(&mut self, text: &str) {
        self.render_now(text.to_string());
    }

    /// Flips auto preview. Turning it back on forces one render of `text`.
    pub fn toggle_auto_preview(&mut self, text: &str) -> bool {
        self.set_auto_preview(!self.auto_preview, text);
        self.auto_preview
    }

    pub fn set_auto_preview(&mut self, enabled: bool, text: &str) {
        if enabled == self.auto_preview {
            return;
        }
        self.auto_preview = enabled;
        tracing::info!(enabled, "auto preview toggled");
        if enabled {
            self.force_render(text);
        }
    }

    /// Records the pane size. A width change re-wraps the source already on
    /// display; it never pulls new text from the buffer.
    pub fn resize(&mut self, width: u16, height: u16) {
        let width = width.max(1);
        self.surface.viewport_height = height;
        if width != self.surface.width {
            self.surface.width = width;
            let tree = self.renderer.render(&self.surface.source, width);
            self.surface.tree = tree;
        }
        self.surface.scroll_offset = self.surface.scroll_offset.min(self.surface.max_scroll());
    }

    fn render_now(&mut self, source: String) {
        let tree = self.renderer.render(&source, self.surface.width);
        self.surface.apply(source, tree);
    }
}
