//! Input handling: modal prompts first, then the key table, then the
//! focused pane. Mouse wheel and clicks act on the pane under the pointer.

use super::*;

impl App {
    /// Handles bracketed paste events. Goes to an open path prompt, otherwise
    /// into the editor.
    pub(super) fn handle_paste(&mut self, text: &str, now: Instant) {
        match self.modal.as_mut() {
            Some(Modal::Path(prompt)) => prompt.paste(text),
            Some(_) => {}
            None => {
                self.session.insert_str(text, now);
            }
        }
    }

    // ─── Key handling ────────────────────────────────────────────────────

    pub(super) fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if self.modal.is_some() {
            self.handle_modal_key(key, now);
            return;
        }

        // Esc: hand focus back to the editor when it is on screen
        if key.code == KeyCode::Esc && key.modifiers.is_empty() {
            if self.session.view().preview_focused() && self.session.set_focus(Focus::Editor) {
                self.sync_cursor_visibility();
            }
            return;
        }

        if let Some(binding) = keymap::lookup(&key) {
            let applies =
                binding.scope == Scope::Global || self.session.view().editor_focused();
            if applies {
                self.run_command(binding.command, now);
                return;
            }
        }

        if self.session.view().editor_focused() {
            self.session.edit(key, now);
        } else {
            self.handle_preview_key(key);
        }
    }

    /// Scroll keys for a focused preview pane.
    fn handle_preview_key(&mut self, key: KeyEvent) {
        let surface = self.session.preview_surface_mut();
        match key.code {
            KeyCode::Up => surface.scroll_up(1),
            KeyCode::Down => surface.scroll_down(1),
            KeyCode::PageUp => surface.page_up(),
            KeyCode::PageDown => surface.page_down(),
            KeyCode::Home => surface.scroll_home(),
            KeyCode::End => surface.scroll_end(),
            _ => {}
        }
    }

    pub(super) fn run_command(&mut self, command: Command, now: Instant) {
        tracing::debug!(?command, "command");
        match command {
            Command::Quit => {
                let outcome = self.session.request(PendingAction::Quit);
                self.handle_outcome(outcome, None);
            }
            Command::New => {
                let outcome = self.session.request(PendingAction::New);
                self.handle_outcome(outcome, None);
            }
            Command::Open => {
                if !self.session.reject_if_busy() {
                    self.modal = Some(Modal::Path(PathPrompt::new(PathPurpose::Open, "")));
                }
            }
            Command::Save => {
                let outcome = self.session.save();
                self.handle_outcome(outcome, Some(PathPurpose::SaveAs));
            }
            Command::SaveAs => {
                let initial = self
                    .session
                    .file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.modal = Some(Modal::Path(PathPrompt::new(PathPurpose::SaveAs, initial)));
            }
            Command::ToggleView => {
                self.session.toggle_view();
                self.sync_cursor_visibility();
            }
            Command::SyncPreview => {
                self.session.sync_scroll();
            }
            Command::FocusNext => {
                self.session.cycle_focus();
                self.sync_cursor_visibility();
            }
            Command::TagPicker => {
                if self.session.view().state().editor_visible() {
                    self.modal = Some(Modal::Picker(ListPicker::new(PickerKind::Tags)));
                } else {
                    self.set_status("Tags need the editor; press Ctrl+T to show it");
                }
            }
            Command::Options => {
                self.modal = Some(Modal::Picker(ListPicker::new(PickerKind::Options)));
            }
            Command::Help => self.modal = Some(Modal::Help),
            Command::SelectAll => self.session.select_all(),
            Command::Copy => self.copy_selection(),
            Command::Cut => {
                if let Some(text) = self.session.cut_selection(now) {
                    self.copy_to_clipboard(&text);
                }
            }
            Command::Paste => self.paste_clipboard(now),
            Command::DocumentStart => self.session.jump_to_start(),
            Command::DocumentEnd => self.session.jump_to_end(),
        }
    }

    /// Opens whatever prompt the session asked for. `save_purpose` is the
    /// prompt used when a plain save needs a path.
    fn handle_outcome(&mut self, outcome: Outcome, save_purpose: Option<PathPurpose>) {
        match outcome {
            Outcome::AskDecision => {
                let message = format!("Save changes to {}?", self.session.display_name());
                self.modal = Some(Modal::Decision(DecisionDialog::new(message)));
            }
            Outcome::AskSavePath => {
                let purpose = save_purpose.unwrap_or(PathPurpose::GateSave);
                self.modal = Some(Modal::Path(PathPrompt::new(purpose, "")));
            }
            Outcome::Done | Outcome::Cancelled | Outcome::Rejected | Outcome::Failed => {}
        }
    }

    // ─── Modal prompts ───────────────────────────────────────────────────

    fn handle_modal_key(&mut self, key: KeyEvent, now: Instant) {
        // Destructive commands while the gate is waiting on this prompt are
        // refused rather than queued.
        if let Some(binding) = keymap::lookup(&key) {
            if matches!(binding.command, Command::Quit | Command::New | Command::Open)
                && self.session.reject_if_busy()
            {
                return;
            }
        }

        let Some(mut modal) = self.modal.take() else {
            return;
        };
        match &mut modal {
            // Help modal: any key dismisses it
            Modal::Help => {}
            Modal::Decision(dialog) => match dialog.handle_key(key) {
                DialogResult::Done(decision) => {
                    let outcome = self.session.decide(decision);
                    self.handle_outcome(outcome, None);
                }
                DialogResult::Dismissed => {
                    self.session.decide(Decision::Cancel);
                }
                DialogResult::Pending => self.modal = Some(modal),
            },
            Modal::Path(prompt) => {
                let purpose = prompt.purpose;
                match prompt.handle_key(key, self.session.file_path()) {
                    DialogResult::Done(path) => self.path_chosen(purpose, path),
                    DialogResult::Dismissed => {
                        if purpose == PathPurpose::GateSave {
                            self.session.save_path_chosen(None);
                        }
                    }
                    DialogResult::Pending => self.modal = Some(modal),
                }
            }
            Modal::Picker(picker) => {
                let kind = picker.kind;
                match picker.handle_key(key) {
                    DialogResult::Done(index) => self.picked(kind, index, now),
                    DialogResult::Dismissed => {}
                    DialogResult::Pending => self.modal = Some(modal),
                }
            }
        }
    }

    fn path_chosen(&mut self, purpose: PathPurpose, path: PathBuf) {
        let outcome = match purpose {
            PathPurpose::Open => self.session.request(PendingAction::Open(path)),
            PathPurpose::SaveAs => self.session.save_as(path),
            PathPurpose::GateSave => self.session.save_path_chosen(Some(path)),
        };
        self.handle_outcome(outcome, None);
    }

    fn picked(&mut self, kind: PickerKind, index: usize, now: Instant) {
        match kind {
            PickerKind::Tags => {
                let Some((_, snippet)) = MARKDOWN_TAGS.get(index) else {
                    return;
                };
                if self.session.set_focus(Focus::Editor) {
                    self.sync_cursor_visibility();
                    self.session.insert_str(snippet, now);
                }
            }
            PickerKind::Options => {
                let Some((_, item)) = OPTION_ITEMS.get(index) else {
                    return;
                };
                match item {
                    OptionItem::CopyAll => {
                        let text = self.session.text();
                        self.copy_to_clipboard(&text);
                        self.set_status("Copied document");
                    }
                    OptionItem::CopySelection => self.copy_selection(),
                    OptionItem::Paste => {
                        if self.session.set_focus(Focus::Editor) {
                            self.sync_cursor_visibility();
                            self.paste_clipboard(now);
                        }
                    }
                    OptionItem::ToggleAutoPreview => {
                        self.session.toggle_auto_preview();
                    }
                    OptionItem::UpdatePreview => {
                        self.session.force_preview();
                        self.set_status("Preview updated");
                    }
                }
            }
        }
    }

    fn copy_selection(&mut self) {
        match self.session.buffer().selected_text() {
            Some(text) => {
                self.copy_to_clipboard(&text);
                self.set_status("Copied selection");
            }
            None => self.set_status("Nothing selected"),
        }
    }

    fn paste_clipboard(&mut self, now: Instant) {
        if let Some(text) = self.paste_from_clipboard() {
            self.session.insert_str(&text, now);
        }
    }

    // ─── Mouse handling ──────────────────────────────────────────────────

    pub(super) fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.modal.is_some() {
            return;
        }
        let in_editor = contains(self.editor_area, mouse.column, mouse.row);
        let in_preview = contains(self.preview_area, mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::ScrollUp if in_preview => {
                self.session.preview_surface_mut().scroll_up(SCROLL_LINES);
            }
            MouseEventKind::ScrollDown if in_preview => {
                self.session.preview_surface_mut().scroll_down(SCROLL_LINES);
            }
            MouseEventKind::ScrollUp if in_editor => {
                self.session.scroll_editor(-(SCROLL_LINES as i16));
                self.editor_scroll_top = self.editor_scroll_top.saturating_sub(SCROLL_LINES);
            }
            MouseEventKind::ScrollDown if in_editor => {
                self.session.scroll_editor(SCROLL_LINES as i16);
                let max_scroll = (self.session.buffer().line_count() as u16).saturating_sub(1);
                self.editor_scroll_top = (self.editor_scroll_top + SCROLL_LINES).min(max_scroll);
            }
            MouseEventKind::Down(MouseButton::Left) if in_editor => {
                if self.session.set_focus(Focus::Editor) {
                    self.sync_cursor_visibility();
                }
                let (row, col) = self.mouse_to_buffer_pos(mouse.column, mouse.row);
                self.session.jump_to(row as usize, col as usize);
            }
            MouseEventKind::Down(MouseButton::Left) if in_preview => {
                if self.session.set_focus(Focus::Preview) {
                    self.sync_cursor_visibility();
                }
            }
            _ => {}
        }
    }

    /// Converts terminal mouse coordinates to buffer (row, col) positions,
    /// accounting for the line number gutter width and scroll offset.
    pub(super) fn mouse_to_buffer_pos(&self, column: u16, row: u16) -> (u16, u16) {
        let area = self.editor_area;
        let gutter_width = self.session.buffer().gutter_width();
        let buffer_row = row.saturating_sub(area.y) + self.editor_scroll_top;
        let buffer_col = column.saturating_sub(area.x).saturating_sub(gutter_width);
        (buffer_row, buffer_col)
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}
