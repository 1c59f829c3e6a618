//! Modal overlays. Each one is centered over the frame and clears what is
//! behind it.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::dialogs::{DecisionDialog, ListPicker, PathPrompt, DECISION_BUTTONS};
use crate::theme::Palette;

/// A `width` x `height` rect centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn frame_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(palette.heading).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(palette.border))
        .style(palette.dialog_style())
}

pub fn render_decision(frame: &mut Frame, dialog: &DecisionDialog, palette: &Palette) {
    let area = centered(frame.area(), 46, 7);
    frame.render_widget(Clear, area);

    let mut buttons = Vec::new();
    for (i, (label, _)) in DECISION_BUTTONS.iter().enumerate() {
        let style = if i == dialog.selected {
            Style::default()
                .fg(palette.bg)
                .bg(palette.active_tab)
                .add_modifier(Modifier::BOLD)
        } else {
            palette.dialog_style()
        };
        buttons.push(Span::styled(format!(" {label} "), style));
        buttons.push(Span::raw("  "));
    }
    buttons.pop();

    let lines = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(buttons),
    ];
    let paragraph = Paragraph::new(lines)
        .block(frame_block("Unsaved changes", palette))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

pub fn render_path(frame: &mut Frame, prompt: &PathPrompt, palette: &Palette) {
    let area = centered(frame.area(), 60, 6);
    frame.render_widget(Clear, area);

    let input_style = palette.dialog_style();
    let cursor_style = Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD);

    // Text before cursor, cursor cell (or a space at the end), text after
    let before: String = prompt.input.chars().take(prompt.cursor).collect();
    let mut rest = prompt.input.chars().skip(prompt.cursor);
    let at = rest.next().map_or_else(|| " ".to_string(), |c| c.to_string());
    let after: String = rest.collect();

    let input_line = Line::from(vec![
        Span::styled(" ", input_style),
        Span::styled(before, input_style),
        Span::styled(at, cursor_style),
        Span::styled(after, input_style),
    ]);

    let hint = match (&prompt.confirm_overwrite, &prompt.error) {
        (Some(path), _) => Line::from(Span::styled(
            format!(" {} exists. Overwrite? (y/n)", path.display()),
            Style::default().fg(palette.warning),
        )),
        (None, Some(err)) => Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(palette.error),
        )),
        (None, None) => Line::from(Span::styled(
            " Enter: confirm | Tab: complete | Esc: cancel",
            Style::default().fg(palette.inactive_tab),
        )),
    };

    let paragraph = Paragraph::new(vec![Line::from(""), input_line, Line::from(""), hint])
        .block(frame_block(prompt.purpose.title(), palette));
    frame.render_widget(paragraph, area);
}

pub fn render_picker(frame: &mut Frame, picker: &ListPicker, palette: &Palette) {
    let labels = picker.labels();
    let height = labels.len() as u16 + 2;
    let area = centered(frame.area(), 36, height);
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = labels
        .into_iter()
        .map(|label| ListItem::new(format!(" {label}")))
        .collect();
    let list = List::new(items)
        .block(frame_block(picker.title(), palette))
        .highlight_style(
            Style::default()
                .fg(palette.bg)
                .bg(palette.active_tab)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default().with_selected(Some(picker.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Keybinding overlay. `rows` are (keys, description) pairs.
pub fn render_help(frame: &mut Frame, rows: &[(String, &str)], palette: &Palette) {
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0) + 2;
    let width = rows
        .iter()
        .map(|(_, d)| d.chars().count())
        .max()
        .unwrap_or(0) as u16
        + key_width as u16
        + 6;
    let area = centered(frame.area(), width, rows.len() as u16 + 5);
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (keys, description) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {keys:<key_width$}"), Style::default().fg(palette.link)),
            Span::raw(description.to_string()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press any key to close",
        Style::default().fg(palette.inactive_tab),
    )));

    let paragraph = Paragraph::new(lines)
        .block(frame_block("Keybindings", palette))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
