//! Per-file diagnostics.

use crate::base::FileId;
use crate::hir::{Diagnostic, dedup_diagnostics};

use super::Analysis;

/// Everything known to be wrong in a file: syntax and lowering problems,
/// dependency cycles, evaluation issues, dropped user values and the last
/// import. Deduplicated by span and message, sorted by position.
pub fn file_diagnostics(analysis: &Analysis, file: FileId) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = analysis
        .project()
        .diagnostics
        .iter()
        .chain(analysis.graph().cycle_diagnostics())
        .chain(analysis.model().issues())
        .chain(analysis.transient_diagnostics())
        .filter(|d| d.file == file)
        .cloned()
        .collect();
    dedup_diagnostics(&mut diagnostics);
    diagnostics
}
