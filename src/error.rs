//! Error types shared by the editing core and its collaborators.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::gate::GateError;

/// Failures the core can surface to the user. None of them are fatal: the
/// session turns each one into a status-bar notice and leaves its state as
/// it was before the failing operation.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("{} is not valid UTF-8 text", .0.display())]
    Decode(PathBuf),

    #[error("File system error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Gate(#[from] GateError),
}

pub type EditorResult<T> = Result<T, EditorError>;

impl EditorError {
    /// Classifies an `io::Error` raised while touching `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => EditorError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => EditorError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::InvalidData => EditorError::Decode(path.to_path_buf()),
            _ => EditorError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}
