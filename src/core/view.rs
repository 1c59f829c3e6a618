//! View layout state machine: which panes are visible and which one owns
//! keyboard focus.

use serde::{Deserialize, Serialize};

/// The three layouts, cycled by `toggle` in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewState {
    #[default]
    #[serde(rename = "split")]
    Split,
    #[serde(rename = "editor")]
    EditorOnly,
    #[serde(rename = "preview")]
    PreviewOnly,
}

impl ViewState {
    pub fn next(self) -> Self {
        match self {
            ViewState::Split => ViewState::EditorOnly,
            ViewState::EditorOnly => ViewState::PreviewOnly,
            ViewState::PreviewOnly => ViewState::Split,
        }
    }

    pub fn editor_visible(self) -> bool {
        self != ViewState::PreviewOnly
    }

    pub fn preview_visible(self) -> bool {
        self != ViewState::EditorOnly
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewState::Split => "SPLIT",
            ViewState::EditorOnly => "EDITOR",
            ViewState::PreviewOnly => "PREVIEW",
        }
    }

    /// Only a visible pane may hold focus.
    fn shows(self, pane: Focus) -> bool {
        match pane {
            Focus::Editor => self.editor_visible(),
            Focus::Preview => self.preview_visible(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Preview,
}

/// Result of a layout change; the session uses it to trigger side effects
/// (forced render when entering `PreviewOnly`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ViewState,
    pub to: ViewState,
}

impl Transition {
    pub fn entered_preview_only(&self) -> bool {
        self.to == ViewState::PreviewOnly && self.from != ViewState::PreviewOnly
    }
}

#[derive(Debug, Clone)]
pub struct ViewStateMachine {
    state: ViewState,
    focus: Focus,
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new(ViewState::Split)
    }
}

impl ViewStateMachine {
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            focus: Self::default_focus(state),
        }
    }

    fn default_focus(state: ViewState) -> Focus {
        if state.editor_visible() {
            Focus::Editor
        } else {
            Focus::Preview
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Advances Split → EditorOnly → PreviewOnly → Split. Focus lands on the
    /// editor whenever it is visible, on the preview otherwise.
    pub fn toggle(&mut self) -> Transition {
        let from = self.state;
        self.state = from.next();
        self.focus = Self::default_focus(self.state);
        Transition {
            from,
            to: self.state,
        }
    }

    /// Moves focus to `pane`. Refused (returns `false`) when that pane is
    /// hidden in the current layout.
    pub fn set_focus(&mut self, pane: Focus) -> bool {
        if !self.state.shows(pane) {
            return false;
        }
        self.focus = pane;
        true
    }

    /// Switches focus to the other pane; only meaningful in `Split`.
    pub fn cycle_focus(&mut self) -> bool {
        let other = match self.focus {
            Focus::Editor => Focus::Preview,
            Focus::Preview => Focus::Editor,
        };
        self.set_focus(other)
    }

    pub fn editor_focused(&self) -> bool {
        self.focus == Focus::Editor
    }

    pub fn preview_focused(&self) -> bool {
        self.focus == Focus::Preview
    }
}
