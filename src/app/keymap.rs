//! Key chord → command table. The help overlay is generated from it, so the
//! two cannot drift apart.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save,
    SaveAs,
    Open,
    New,
    ToggleView,
    SyncPreview,
    FocusNext,
    TagPicker,
    Options,
    Help,
    SelectAll,
    Copy,
    Cut,
    Paste,
    DocumentStart,
    DocumentEnd,
}

/// Where a binding applies. Editor bindings are ignored unless the editor
/// pane has focus, so the key falls through to the preview instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Editor,
}

#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub command: Command,
    pub scope: Scope,
    /// Label in the help overlay; empty for terminal-specific aliases.
    pub keys: &'static str,
    pub description: &'static str,
}

const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const CTRL_SHIFT: KeyModifiers = KeyModifiers::CONTROL.union(KeyModifiers::SHIFT);
const NONE: KeyModifiers = KeyModifiers::NONE;

const fn bind(
    code: KeyCode,
    modifiers: KeyModifiers,
    command: Command,
    scope: Scope,
    keys: &'static str,
    description: &'static str,
) -> Binding {
    Binding {
        code,
        modifiers,
        command,
        scope,
        keys,
        description,
    }
}

pub const BINDINGS: &[Binding] = &[
    bind(KeyCode::Char('q'), CTRL, Command::Quit, Scope::Global, "Ctrl+Q", "Quit"),
    bind(KeyCode::Char('s'), CTRL, Command::Save, Scope::Global, "Ctrl+S", "Save"),
    bind(KeyCode::Char('s'), CTRL_SHIFT, Command::SaveAs, Scope::Global, "Ctrl+Shift+S", "Save as"),
    bind(KeyCode::Char('s'), KeyModifiers::ALT, Command::SaveAs, Scope::Global, "Alt+S", "Save as"),
    bind(KeyCode::Char('o'), CTRL, Command::Open, Scope::Global, "Ctrl+O", "Open file"),
    bind(KeyCode::Char('n'), CTRL, Command::New, Scope::Global, "Ctrl+N", "New document"),
    bind(KeyCode::Char('t'), CTRL, Command::ToggleView, Scope::Global, "Ctrl+T", "Cycle split / editor / preview"),
    bind(KeyCode::Char('j'), CTRL, Command::SyncPreview, Scope::Global, "Ctrl+J", "Sync preview to cursor"),
    bind(KeyCode::F(6), NONE, Command::FocusNext, Scope::Global, "F6", "Switch pane focus"),
    bind(KeyCode::Char('g'), CTRL, Command::TagPicker, Scope::Global, "Ctrl+G", "Insert markdown tag"),
    bind(KeyCode::Char('\\'), CTRL, Command::Options, Scope::Global, "Ctrl+\\", "Options"),
    // Many terminals report Ctrl+\ as Ctrl+4
    bind(KeyCode::Char('4'), CTRL, Command::Options, Scope::Global, "", "Options"),
    bind(KeyCode::F(2), NONE, Command::Options, Scope::Global, "F2", "Options"),
    bind(KeyCode::Char('l'), CTRL, Command::Help, Scope::Global, "Ctrl+L", "This help"),
    bind(KeyCode::F(1), NONE, Command::Help, Scope::Global, "F1", "This help"),
    bind(KeyCode::Char('a'), CTRL, Command::SelectAll, Scope::Editor, "Ctrl+A", "Select all"),
    bind(KeyCode::Char('c'), CTRL, Command::Copy, Scope::Editor, "Ctrl+C", "Copy selection"),
    bind(KeyCode::Char('x'), CTRL, Command::Cut, Scope::Editor, "Ctrl+X", "Cut selection"),
    bind(KeyCode::Char('v'), CTRL, Command::Paste, Scope::Editor, "Ctrl+V", "Paste"),
    bind(KeyCode::Home, CTRL, Command::DocumentStart, Scope::Editor, "Ctrl+Home", "Go to document start"),
    bind(KeyCode::End, CTRL, Command::DocumentEnd, Scope::Editor, "Ctrl+End", "Go to document end"),
];

/// Folds the ways terminals report a shifted letter (`'S'`, `'S'+SHIFT`,
/// `'s'+SHIFT`) into lowercase plus an explicit SHIFT.
fn normalize(key: &KeyEvent) -> (KeyCode, KeyModifiers) {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => {
            (KeyCode::Char(c.to_ascii_lowercase()), key.modifiers | KeyModifiers::SHIFT)
        }
        code => (code, key.modifiers),
    }
}

pub fn lookup(key: &KeyEvent) -> Option<&'static Binding> {
    let (code, modifiers) = normalize(key);
    BINDINGS
        .iter()
        .find(|b| b.code == code && b.modifiers == modifiers)
}

/// Help overlay rows: one per command, aliases joined with ` / `.
pub fn help_rows() -> Vec<(String, &'static str)> {
    let mut rows: Vec<(Command, String, &'static str)> = Vec::new();
    for binding in BINDINGS.iter().filter(|b| !b.keys.is_empty()) {
        match rows.iter_mut().find(|(cmd, _, _)| *cmd == binding.command) {
            Some((_, keys, _)) => {
                keys.push_str(" / ");
                keys.push_str(binding.keys);
            }
            None => rows.push((binding.command, binding.keys.to_string(), binding.description)),
        }
    }
    rows.into_iter().map(|(_, keys, desc)| (keys, desc)).collect()
}
