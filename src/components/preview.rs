use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::core::preview::PreviewSurface;
use crate::theme::Palette;

/// Columns kept free around the rendered text: one of padding on the left
/// and one for the scrollbar.
pub const HORIZONTAL_INSET: u16 = 2;

/// Area the markdown is wrapped to inside a preview pane.
pub fn text_area(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(HORIZONTAL_INSET),
        ..area
    }
}

/// Draws the last applied render at the surface's scroll offset.
pub fn render(frame: &mut Frame, area: Rect, surface: &PreviewSurface, palette: &Palette) {
    frame.render_widget(Paragraph::new("").style(palette.editor_style()), area);

    let paragraph = Paragraph::new(surface.tree().text.clone())
        .style(palette.editor_style())
        .scroll((surface.scroll_offset(), 0));
    frame.render_widget(paragraph, text_area(area));

    // Scrollbar
    let content_height = surface.content_height();
    if content_height > area.height {
        let mut scrollbar_state = ScrollbarState::new(content_height as usize)
            .position(surface.scroll_offset() as usize)
            .viewport_content_length(area.height as usize);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(palette.line_number))
            .track_style(Style::default().fg(palette.border));
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}
