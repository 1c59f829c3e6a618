//! Cursor-to-preview scroll mapping.
//!
//! The mapping is line-proportional: the cursor's fraction of the source is
//! applied to the scrollable range of the rendered preview. It assumes every
//! source line renders to the same height, which headings, code blocks and
//! tables break. That coarseness is accepted; there is no structural mapping
//! between source lines and rendered rows.

use super::buffer::TextBuffer;
use super::preview::PreviewRenderer;
use super::view::{Focus, ViewStateMachine};

/// Proportional scroll target for a 0-based `cursor_line`.
pub fn target_offset(
    cursor_line: usize,
    total_lines: usize,
    content_height: u16,
    viewport_height: u16,
) -> u16 {
    let fraction = cursor_line as f64 / total_lines.max(1) as f64;
    let range = content_height.saturating_sub(viewport_height);
    (fraction * f64::from(range)) as u16
}

/// Re-renders the preview from the buffer and scrolls it to the cursor's
/// proportional position. Focus passes through the preview and returns to
/// the editor if the editor held it before. Returns the applied offset.
pub fn sync(buffer: &TextBuffer, preview: &mut PreviewRenderer, view: &mut ViewStateMachine) -> u16 {
    let had_editor_focus = view.editor_focused();
    view.set_focus(Focus::Preview);

    preview.force_render(&buffer.text());

    let (cursor_line, _) = buffer.cursor();
    let surface = preview.surface_mut();
    let target = target_offset(
        cursor_line,
        buffer.line_count(),
        surface.content_height(),
        surface.viewport_height(),
    );
    surface.scroll_to(target);

    if had_editor_focus {
        view.set_focus(Focus::Editor);
    }
    tracing::debug!(cursor_line, target, "preview synced to cursor");
    surface.scroll_offset()
}
