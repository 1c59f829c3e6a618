use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::ViewState;
use crate::theme::Palette;

const TABS: [ViewState; 3] = [ViewState::Split, ViewState::EditorOnly, ViewState::PreviewOnly];

pub fn render(
    frame: &mut Frame,
    area: Rect,
    filename: &str,
    dirty: bool,
    view: ViewState,
    palette: &Palette,
) {
    let bar = palette.bar_style();

    // Left side: filename + modified indicator
    let mut left_spans = vec![Span::styled(format!("  {filename}"), bar)];
    if dirty {
        left_spans.push(Span::styled(
            " \u{2022}",
            Style::default().fg(palette.warning).bg(palette.bar_bg),
        ));
    }

    // Right side: layout tabs
    let right_spans: Vec<Span> = TABS
        .iter()
        .map(|tab| {
            let label = format!(" {} ", tab.label());
            if *tab == view {
                Span::styled(
                    label,
                    Style::default()
                        .fg(palette.bg)
                        .bg(palette.active_tab)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(label, Style::default().fg(palette.inactive_tab).bg(palette.bar_bg))
            }
        })
        .collect();

    let chunks = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(right_spans.iter().map(|s| s.width() as u16).sum()),
    ])
    .split(area);

    // Fill background
    frame.render_widget(Paragraph::new("").style(bar), area);
    frame.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    frame.render_widget(Paragraph::new(Line::from(right_spans)), chunks[1]);
}
