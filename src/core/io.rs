//! File access behind a trait so the session can be driven in tests without
//! touching the disk.

use std::fs;
use std::path::Path;

use crate::error::{EditorError, EditorResult};

pub trait FileIo {
    fn read(&self, path: &Path) -> EditorResult<String>;
    fn write(&self, path: &Path, text: &str) -> EditorResult<()>;
}

/// The real file system. Writes create missing parent directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsIo;

impl FileIo for FsIo {
    fn read(&self, path: &Path) -> EditorResult<String> {
        fs::read_to_string(path).map_err(|e| EditorError::from_io(path, e))
    }

    fn write(&self, path: &Path, text: &str) -> EditorResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| EditorError::from_io(parent, e))?;
        }
        fs::write(path, text).map_err(|e| EditorError::from_io(path, e))
    }
}
