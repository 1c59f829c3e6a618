//! UI rendering: main frame layout, the two panes and modal overlays.

use super::*;

/// Extra help rows for input that is not in the key table.
const EXTRA_HELP: &[(&str, &str)] = &[
    ("Esc", "Focus editor"),
    ("Wheel", "Scroll pane under pointer"),
    ("Click", "Focus pane / place cursor"),
];

impl App {
    /// Runs one frame of the main loop: draw + tick.
    pub fn render_frame<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
        now: Instant,
    ) -> std::io::Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        self.dispatch(AppEvent::Tick(now));
        Ok(())
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame) {
        let full = frame.area();
        frame.render_widget(Paragraph::new("").style(self.palette.editor_style()), full);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Divider
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Divider
            Constraint::Length(1), // Status
        ])
        .split(full);

        let view = self.session.view().state();
        header::render(
            frame,
            chunks[0],
            &self.session.display_name(),
            self.session.is_dirty(),
            view,
            &self.palette,
        );

        // Thin dividers between bars and content
        let divider_style = Style::default().fg(self.palette.border);
        for area in [chunks[1], chunks[3]] {
            let divider = Paragraph::new("\u{2500}".repeat(area.width as usize)).style(divider_style);
            frame.render_widget(divider, area);
        }

        let (editor_area, preview_area) = match view {
            ViewState::Split => {
                let panes = Layout::horizontal([
                    Constraint::Fill(1),
                    Constraint::Length(1),
                    Constraint::Fill(1),
                ])
                .split(chunks[2]);
                let separator = vec![Line::from("\u{2502}"); panes[1].height as usize];
                frame.render_widget(Paragraph::new(separator).style(divider_style), panes[1]);
                (panes[0], panes[2])
            }
            ViewState::EditorOnly => (chunks[2], Rect::default()),
            ViewState::PreviewOnly => (Rect::default(), chunks[2]),
        };
        self.editor_area = editor_area;
        self.preview_area = preview_area;

        if view.editor_visible() {
            self.render_editor(frame, editor_area);
        }
        if view.preview_visible() {
            let text_area = preview::text_area(preview_area);
            self.session.resize_preview(text_area.width, preview_area.height);
            preview::render(frame, preview_area, self.session.preview().surface(), &self.palette);
        }

        // Status bar: cursor position, word count, save status
        let (line, col) = self.session.buffer().cursor_display();
        status::render(
            frame,
            chunks[4],
            status::StatusInfo {
                line,
                col,
                message: &self.status_message,
                is_error: self.status_is_error,
                word_count: self.session.buffer().word_count(),
                dirty: self.session.is_dirty(),
                auto_preview: self.session.preview().auto_preview(),
            },
            &self.palette,
        );

        // Modal overlay, rendered last so it sits on top of everything
        match &self.modal {
            Some(Modal::Decision(dialog)) => dialog::render_decision(frame, dialog, &self.palette),
            Some(Modal::Path(prompt)) => dialog::render_path(frame, prompt, &self.palette),
            Some(Modal::Picker(picker)) => dialog::render_picker(frame, picker, &self.palette),
            Some(Modal::Help) => dialog::render_help(frame, &help_rows(), &self.palette),
            None => {}
        }
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.session.buffer().textarea(), area);

        // Track scroll position (mirrors tui-textarea's internal viewport logic)
        // so we can translate mouse coordinates -> buffer positions correctly.
        let cursor_row = self.session.buffer().cursor().0 as u16;
        if cursor_row < self.editor_scroll_top {
            self.editor_scroll_top = cursor_row;
        } else if self.editor_scroll_top + area.height <= cursor_row {
            self.editor_scroll_top = cursor_row + 1 - area.height;
        }
    }
}

fn help_rows() -> Vec<(String, &'static str)> {
    let mut rows = keymap::help_rows();
    rows.extend(EXTRA_HELP.iter().map(|(k, d)| (k.to_string(), *d)));
    rows
}
