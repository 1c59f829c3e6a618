//! Confirmation gate for destructive actions (new, open, quit).
//!
//! The gate is a pure state machine: it decides *what* should happen and
//! the session performs the I/O. Every path ends back in `Idle`, and while a
//! decision is outstanding a second destructive command is refused.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A destructive intent deferred until the user decides about unsaved work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    New,
    Open(PathBuf),
    Quit,
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingAction::New => write!(f, "new document"),
            PendingAction::Open(path) => write!(f, "open {}", path.display()),
            PendingAction::Quit => write!(f, "quit"),
        }
    }
}

/// The three answers of the unsaved-changes dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    AwaitingDecision(PendingAction),
    /// "Save" was chosen for an untitled document; waiting on the path
    /// chooser.
    AwaitingSavePath(PendingAction),
}

/// What the caller must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStep {
    /// Run the action now.
    Execute(PendingAction),
    /// Show the Save / Discard / Cancel dialog.
    AskDecision,
    /// Ask the user for a save path.
    AskSavePath,
    /// Save to `path`; on success run `then`, on failure drop it.
    SaveThenExecute { path: PathBuf, then: PendingAction },
    /// The action was dropped; nothing changes.
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Finish the pending {0} prompt first")]
    Busy(PendingAction),

    #[error("No action is waiting for a decision")]
    NothingPending,
}

#[derive(Debug, Default)]
pub struct PendingActionGate {
    state: GateState,
}

impl PendingActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GateState::Idle
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match &self.state {
            GateState::Idle => None,
            GateState::AwaitingDecision(action) | GateState::AwaitingSavePath(action) => {
                Some(action)
            }
        }
    }

    /// A destructive command was issued. Clean documents run it at once;
    /// dirty ones park it until `decide`.
    pub fn issue(&mut self, action: PendingAction, dirty: bool) -> Result<GateStep, GateError> {
        if let Some(pending) = self.pending() {
            return Err(GateError::Busy(pending.clone()));
        }
        if !dirty {
            return Ok(GateStep::Execute(action));
        }
        self.state = GateState::AwaitingDecision(action);
        Ok(GateStep::AskDecision)
    }

    /// Resolves the unsaved-changes dialog. `save_target` is the current
    /// file path, if the document has one.
    pub fn decide(
        &mut self,
        decision: Decision,
        save_target: Option<&Path>,
    ) -> Result<GateStep, GateError> {
        let action = match std::mem::take(&mut self.state) {
            GateState::AwaitingDecision(action) => action,
            other => {
                self.state = other;
                return Err(GateError::NothingPending);
            }
        };

        Ok(match decision {
            Decision::Save => match save_target {
                Some(path) => GateStep::SaveThenExecute {
                    path: path.to_path_buf(),
                    then: action,
                },
                None => {
                    self.state = GateState::AwaitingSavePath(action);
                    GateStep::AskSavePath
                }
            },
            Decision::Discard => GateStep::Execute(action),
            Decision::Cancel => GateStep::Cancelled,
        })
    }

    /// Result of the path chooser opened by `AskSavePath`. `None` means the
    /// chooser was dismissed, which cancels the whole action.
    pub fn save_path_chosen(&mut self, path: Option<PathBuf>) -> Result<GateStep, GateError> {
        let action = match std::mem::take(&mut self.state) {
            GateState::AwaitingSavePath(action) => action,
            other => {
                self.state = other;
                return Err(GateError::NothingPending);
            }
        };
        Ok(match path {
            Some(path) => GateStep::SaveThenExecute { path, then: action },
            None => GateStep::Cancelled,
        })
    }
}
