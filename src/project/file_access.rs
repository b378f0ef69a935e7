//! File access collaborator.
//!
//! Everything that reads Kconfig files from "disk" goes through
//! [`FileAccess`], so whole workspaces can be tested in memory.

use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::include::normalize_path;

/// Reads files on behalf of the engine.
pub trait FileAccess: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn exists(&self, path: &Path) -> bool {
        self.read_to_string(path).is_ok()
    }
}

/// File access backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileAccess;

impl FileAccess for OsFileAccess {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file access for tests and unsaved buffers.
#[derive(Debug, Default)]
pub struct MemoryFileAccess {
    files: RwLock<FxHashMap<PathBuf, String>>,
}

impl MemoryFileAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_file(self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files
            .write()
            .insert(normalize_path(path.as_ref()), text.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.write().remove(&normalize_path(path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl FileAccess for MemoryFileAccess {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found: {}", path.display()),
                )
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(&normalize_path(path))
    }
}
