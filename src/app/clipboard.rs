//! System clipboard integration.

use super::*;

impl App {
    // arboard::Clipboard is created on demand (not stored in App; it's not
    // Send and creating it is cheap).

    /// Writes text to the system clipboard via arboard.
    pub(super) fn copy_to_clipboard(&mut self, text: &str) {
        let result = arboard::Clipboard::new().and_then(|mut clip| clip.set_text(text.to_string()));
        if let Err(err) = result {
            tracing::warn!(error = %err, "clipboard write failed");
            self.session.notify(NoticeLevel::Error, "Clipboard unavailable");
        }
    }

    /// Reads text from the system clipboard. Returns None on failure.
    pub(super) fn paste_from_clipboard(&mut self) -> Option<String> {
        match arboard::Clipboard::new().and_then(|mut clip| clip.get_text()) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard read failed");
                self.session.notify(NoticeLevel::Error, "Clipboard unavailable");
                None
            }
        }
    }
}
