//! Helpers for setting up analysis hosts over in-memory workspaces.

use std::path::Path;
use std::sync::Arc;

use kconfig::base::{FileId, Position};
use kconfig::hir::{Tristate, Value};
use kconfig::ide::{Analysis, AnalysisHost};
use kconfig::project::{MemoryFileAccess, ProjectConfig};
use tokio_util::sync::CancellationToken;

pub const ROOT: &str = "/w/Kconfig";

/// Creates an AnalysisHost rooted at [`ROOT`] over the given files.
pub fn host_from_files(files: &[(&str, &str)]) -> AnalysisHost {
    let mut access = MemoryFileAccess::new();
    for (path, text) in files {
        access = access.with_file(path, *text);
    }
    let config = ProjectConfig::default().with_root(ROOT);
    let mut host = AnalysisHost::new(config, Arc::new(access));
    host.reparse(&CancellationToken::new())
        .expect("fresh token is never cancelled");
    host
}

/// Creates an AnalysisHost with a single root file.
pub fn host_from_source(source: &str) -> AnalysisHost {
    host_from_files(&[(ROOT, source)])
}

/// The root file of a host built by [`host_from_files`].
pub fn root_file(analysis: &Analysis) -> FileId {
    analysis
        .file_id(Path::new(ROOT))
        .expect("root should be interned after reparse")
}

pub fn set(host: &mut AnalysisHost, name: &str, value: &str) {
    host.set_value(name, value, &CancellationToken::new())
        .unwrap_or_else(|e| panic!("setting {name}={value} failed: {e}"));
}

pub fn tristate(analysis: &Analysis, name: &str) -> Option<Tristate> {
    analysis.model().value(name).and_then(Value::as_tristate)
}

/// Position of the first occurrence of `needle` in `text`, plus `offset`
/// characters.
pub fn position_of(text: &str, needle: &str, offset: u32) -> Position {
    let at = text
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not in fixture"));
    let before = &text[..at];
    let line = before.matches('\n').count() as u32;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count());
    Position::new(line, column as u32 + offset)
}
