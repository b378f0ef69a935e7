//! Salsa database definition and queries.

use std::sync::Arc;

use crate::base::{FileId, LineIndex};
use crate::parser::{self, Parse, SourceFile};

// ============================================================================
// INPUTS
// ============================================================================

/// Input: The raw text content of a file.
///
/// Set this explicitly when a file is opened or changed.
#[salsa::input]
pub struct FileText {
    pub file: FileId,
    #[return_ref]
    pub text: String,
}

// ============================================================================
// DATABASE
// ============================================================================

/// The root Salsa database.
///
/// Memoizes per-file parsing. Queries are invalidated when their
/// `FileText` input changes.
#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, _event: &dyn Fn() -> salsa::Event) {}
}

impl RootDatabase {
    /// Create a new, empty database.
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// PARSE RESULT
// ============================================================================

/// A parsed file together with its line index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResult {
    pub parse: Parse,
    pub line_index: Arc<LineIndex>,
}

impl ParseResult {
    pub fn source_file(&self) -> SourceFile {
        self.parse.source_file()
    }

    /// Check if there are any syntax errors.
    pub fn has_errors(&self) -> bool {
        !self.parse.errors.is_empty()
    }
}

// ============================================================================
// TRACKED QUERIES
// ============================================================================

/// Parse a file.
///
/// This is a tracked Salsa query - results are memoized and automatically
/// invalidated when the input `FileText` changes.
#[salsa::tracked]
pub fn parse_file(db: &dyn salsa::Database, file_text: FileText) -> ParseResult {
    let text = file_text.text(db);
    let parse = parser::parse(text);
    tracing::debug!(
        file = file_text.file(db).index(),
        bytes = text.len(),
        errors = parse.errors.len(),
        "parsed file"
    );
    ParseResult {
        parse,
        line_index: Arc::new(LineIndex::new(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salsa::Setter;

    #[test]
    fn test_salsa_tracked_parse_query() {
        let db = RootDatabase::new();
        let file_text = FileText::new(&db, FileId::new(0), "config A\n\tbool\n".to_string());

        let result = parse_file(&db, file_text);
        assert!(!result.has_errors(), "{:?}", result.parse.errors);
        assert_eq!(result.source_file().entries().count(), 1);
        assert_eq!(result.line_index.line_count(), 3);
    }

    #[test]
    fn test_salsa_memoization() {
        let db = RootDatabase::new();
        let file_text = FileText::new(&db, FileId::new(0), "menu \"M\"\nendmenu\n".to_string());

        let first = parse_file(&db, file_text);
        let second = parse_file(&db, file_text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_update_reparses() {
        let mut db = RootDatabase::new();
        let file_text = FileText::new(&db, FileId::new(0), "config A\n".to_string());
        assert!(!parse_file(&db, file_text).has_errors());

        file_text.set_text(&mut db).to("menu \"open\"\n".to_string());
        let result = parse_file(&db, file_text);
        assert!(result.has_errors(), "unterminated menu must be reported");
    }
}
