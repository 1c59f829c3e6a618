use ratatui::style::{Modifier, Style};

use crate::core::BufferStyle;
use crate::theme::Palette;

/// Editor widget styling for a palette.
pub fn buffer_style(palette: &Palette) -> BufferStyle {
    BufferStyle {
        text: palette.editor_style(),
        // Block cursor drawn by reversing the cell under it
        cursor: Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
        cursor_line: Style::default(),
        line_number: Some(palette.line_number_style()),
        selection: palette.selection_style(),
        // Tab = 2 spaces
        tab_length: 2,
    }
}
