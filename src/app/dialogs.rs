//! Modal prompts: the unsaved-changes dialog, the path prompt, the list
//! pickers and the help overlay. Each one owns its own state and turns keys
//! into a [`DialogResult`]; the app decides what the answer means.

use std::fs;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::expand_home;
use crate::core::Decision;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult<T> {
    Pending,
    Done(T),
    Dismissed,
}

pub enum Modal {
    Decision(DecisionDialog),
    Path(PathPrompt),
    Picker(ListPicker),
    Help,
}

// ─── Save / Don't Save / Cancel ──────────────────────────────────────────

pub const DECISION_BUTTONS: [(&str, Decision); 3] = [
    ("Save", Decision::Save),
    ("Don't Save", Decision::Discard),
    ("Cancel", Decision::Cancel),
];

#[derive(Debug, Clone)]
pub struct DecisionDialog {
    pub message: String,
    pub selected: usize,
}

impl DecisionDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            selected: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult<Decision> {
        match key.code {
            KeyCode::Left | KeyCode::BackTab => {
                self.selected = (self.selected + DECISION_BUTTONS.len() - 1) % DECISION_BUTTONS.len();
            }
            KeyCode::Right | KeyCode::Tab => {
                self.selected = (self.selected + 1) % DECISION_BUTTONS.len();
            }
            KeyCode::Enter => return DialogResult::Done(DECISION_BUTTONS[self.selected].1),
            KeyCode::Char('s') | KeyCode::Char('y') => return DialogResult::Done(Decision::Save),
            KeyCode::Char('d') | KeyCode::Char('n') => return DialogResult::Done(Decision::Discard),
            KeyCode::Char('c') | KeyCode::Esc => return DialogResult::Done(Decision::Cancel),
            _ => {}
        }
        DialogResult::Pending
    }
}

// ─── Path prompt ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPurpose {
    Open,
    SaveAs,
    /// "Save" was chosen in the unsaved-changes dialog of an untitled
    /// document.
    GateSave,
}

impl PathPurpose {
    pub fn title(self) -> &'static str {
        match self {
            PathPurpose::Open => "Open file",
            PathPurpose::SaveAs | PathPurpose::GateSave => "Save as",
        }
    }

    fn saves(self) -> bool {
        self != PathPurpose::Open
    }
}

/// Single-line path input. The cursor is a char index into `input`.
#[derive(Debug, Clone)]
pub struct PathPrompt {
    pub purpose: PathPurpose,
    pub input: String,
    pub cursor: usize,
    /// Set while asking whether to overwrite an existing file.
    pub confirm_overwrite: Option<PathBuf>,
    pub error: Option<String>,
}

impl PathPrompt {
    pub fn new(purpose: PathPurpose, initial: impl Into<String>) -> Self {
        let input = initial.into();
        Self {
            purpose,
            cursor: input.chars().count(),
            input,
            confirm_overwrite: None,
            error: None,
        }
    }

    /// `current` is the document's own path; saving over it needs no
    /// confirmation.
    pub fn handle_key(&mut self, key: KeyEvent, current: Option<&Path>) -> DialogResult<PathBuf> {
        if let Some(target) = self.confirm_overwrite.clone() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter => DialogResult::Done(target),
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.confirm_overwrite = None;
                    DialogResult::Pending
                }
                _ => DialogResult::Pending,
            };
        }

        self.error = None;
        match key.code {
            KeyCode::Esc => return DialogResult::Dismissed,
            KeyCode::Enter => return self.submit(current),
            KeyCode::Tab => self.complete(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor = 0;
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(ch),
            _ => {}
        }
        DialogResult::Pending
    }

    /// Inserts pasted text, dropping line breaks.
    pub fn paste(&mut self, text: &str) {
        for ch in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert(ch);
        }
    }

    fn submit(&mut self, current: Option<&Path>) -> DialogResult<PathBuf> {
        let raw = self.input.trim();
        if raw.is_empty() {
            self.error = Some("Enter a file name".to_string());
            return DialogResult::Pending;
        }
        let path = expand_home(Path::new(raw));
        if path.is_dir() {
            self.error = Some(format!("{} is a directory", path.display()));
            return DialogResult::Pending;
        }
        if self.purpose.saves() && path.exists() && current != Some(path.as_path()) {
            self.confirm_overwrite = Some(path);
            return DialogResult::Pending;
        }
        DialogResult::Done(path)
    }

    fn len(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.input.insert(at, ch);
        self.cursor += 1;
    }

    fn remove_at(&mut self, char_idx: usize) {
        let at = self.byte_index(char_idx);
        self.input.remove(at);
    }

    /// Completes the last path component from the directory listing: a
    /// unique match is filled in whole, several matches extend to their
    /// common prefix.
    fn complete(&mut self) {
        let (dir_part, prefix) = match self.input.rfind('/') {
            Some(i) => self.input.split_at(i + 1),
            None => ("", self.input.as_str()),
        };
        let dir = if dir_part.is_empty() {
            PathBuf::from(".")
        } else {
            expand_home(Path::new(dir_part))
        };
        let Ok(entries) = fs::read_dir(&dir) else {
            return;
        };

        let mut matches: Vec<(String, bool)> = entries
            .filter_map(Result::ok)
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                name.starts_with(prefix).then_some((name, is_dir))
            })
            .collect();
        matches.sort();

        let completed = match matches.as_slice() {
            [] => return,
            [(name, is_dir)] => {
                let mut name = name.clone();
                if *is_dir {
                    name.push('/');
                }
                name
            }
            [first, rest @ ..] => rest.iter().fold(first.0.clone(), |acc, (name, _)| {
                common_prefix(&acc, name).to_string()
            }),
        };
        self.input = format!("{dir_part}{completed}");
        self.cursor = self.len();
    }
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i);
    &a[..end]
}

// ─── List pickers ────────────────────────────────────────────────────────

/// Snippets offered by the tag picker.
pub const MARKDOWN_TAGS: &[(&str, &str)] = &[
    ("Header 1", "# Header"),
    ("Header 2", "## Header"),
    ("Header 3", "### Header"),
    ("Bold", "**bold text**"),
    ("Italic", "*italic text*"),
    ("Bold Italic", "***bold italic***"),
    ("Strikethrough", "~~strikethrough text~~"),
    ("Inline Code", "`code`"),
    ("Code Block", "```\ncode block\n```"),
    ("Blockquote", "> blockquote"),
    ("Unordered List", "- list item"),
    ("Ordered List", "1. list item"),
    ("Link", "[text](url)"),
    ("Image", "![alt](image.jpg)"),
    ("Horizontal Rule", "---"),
    ("Table", "| Header | Header |\n|--------|--------|\n| Cell   | Cell   |"),
    ("Task List", "- [ ] task"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionItem {
    CopyAll,
    CopySelection,
    Paste,
    ToggleAutoPreview,
    UpdatePreview,
}

pub const OPTION_ITEMS: &[(&str, OptionItem)] = &[
    ("Copy All", OptionItem::CopyAll),
    ("Copy Selection", OptionItem::CopySelection),
    ("Paste", OptionItem::Paste),
    ("Toggle Auto Update Preview", OptionItem::ToggleAutoPreview),
    ("Update Preview", OptionItem::UpdatePreview),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Tags,
    Options,
}

const PAGE: usize = 5;

#[derive(Debug, Clone)]
pub struct ListPicker {
    pub kind: PickerKind,
    pub selected: usize,
}

impl ListPicker {
    pub fn new(kind: PickerKind) -> Self {
        Self { kind, selected: 0 }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            PickerKind::Tags => "Markdown tags",
            PickerKind::Options => "Options",
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        match self.kind {
            PickerKind::Tags => MARKDOWN_TAGS.iter().map(|(label, _)| *label).collect(),
            PickerKind::Options => OPTION_ITEMS.iter().map(|(label, _)| *label).collect(),
        }
    }

    fn len(&self) -> usize {
        match self.kind {
            PickerKind::Tags => MARKDOWN_TAGS.len(),
            PickerKind::Options => OPTION_ITEMS.len(),
        }
    }

    /// Returns the chosen index on Enter.
    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult<usize> {
        let last = self.len().saturating_sub(1);
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(last),
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(PAGE),
            KeyCode::PageDown => self.selected = (self.selected + PAGE).min(last),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = last,
            KeyCode::Enter => return DialogResult::Done(self.selected),
            KeyCode::Esc => return DialogResult::Dismissed,
            _ => {}
        }
        DialogResult::Pending
    }
}
