//! Stable path to [`FileId`] mapping.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use super::include::normalize_path;
use crate::base::FileId;

/// Interns file paths. Ids are never reused, so a `FileId` stays valid
/// after its file is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: IndexSet<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for a path, allocating one on first use.
    pub fn intern(&mut self, path: &Path) -> FileId {
        let (index, _) = self.paths.insert_full(normalize_path(path));
        FileId::new(index as u32)
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.paths
            .get_index_of(&normalize_path(path))
            .map(|index| FileId::new(index as u32))
    }

    pub fn path(&self, file: FileId) -> Option<&Path> {
        self.paths.get_index(file.index()).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Path)> + '_ {
        self.paths
            .iter()
            .enumerate()
            .map(|(index, path)| (FileId::new(index as u32), path.as_path()))
    }
}
