//! Unsaved-changes tracking against the last loaded/saved snapshot.

/// Holds the text as it was last loaded or saved and a cached comparison
/// against the live buffer. The cached flag is only as fresh as the last
/// `recompute`; the session calls it after every content mutation.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    snapshot: String,
    dirty: bool,
}

impl DirtyTracker {
    pub fn new(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: snapshot.into(),
            dirty: false,
        }
    }

    /// Compares `current` with the snapshot and caches the result.
    pub fn recompute(&mut self, current: &str) -> bool {
        self.dirty = current != self.snapshot;
        self.dirty
    }

    /// Records `current` as the new baseline after a successful save or load.
    pub fn mark_clean(&mut self, current: impl Into<String>) {
        self.snapshot = current.into();
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}
