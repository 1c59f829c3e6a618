use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Palette;

pub struct StatusInfo<'a> {
    /// 1-based, as displayed.
    pub line: usize,
    pub col: usize,
    pub message: &'a str,
    pub is_error: bool,
    pub word_count: usize,
    pub dirty: bool,
    pub auto_preview: bool,
}

pub fn render(frame: &mut Frame, area: Rect, info: StatusInfo, palette: &Palette) {
    let bar = palette.bar_style();
    frame.render_widget(Paragraph::new("").style(bar), area);

    let chunks = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(1),
    ])
    .split(area);

    // Left: Ln/Col
    let left = Paragraph::new(Line::from(Span::styled(
        format!("  Ln {}, Col {}", info.line, info.col),
        bar,
    )));
    frame.render_widget(left, chunks[0]);

    // Center: status message
    if !info.message.is_empty() {
        let style = if info.is_error {
            Style::default().fg(palette.error).bg(palette.bar_bg)
        } else {
            bar
        };
        let center = Paragraph::new(Line::from(Span::styled(info.message.to_string(), style)))
            .alignment(Alignment::Center);
        frame.render_widget(center, chunks[1]);
    }

    // Right: auto-preview flag, word count, save status
    let mut right_spans = Vec::new();
    if !info.auto_preview {
        right_spans.push(Span::styled(
            "MANUAL | ",
            Style::default().fg(palette.warning).bg(palette.bar_bg),
        ));
    }
    let save_status = if info.dirty { "Modified" } else { "Saved" };
    right_spans.push(Span::styled(
        format!("{} words | {save_status}  ", info.word_count),
        bar,
    ));
    let right = Paragraph::new(Line::from(right_spans)).alignment(Alignment::Right);
    frame.render_widget(right, chunks[2]);
}
