//! Diagnostics: source-level problems found while parsing, lowering, and
//! evaluating.
//!
//! Diagnostics carry byte ranges; the IDE layer converts them to
//! line/column spans with the file's [`LineIndex`].

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{FileId, FileRange, LineIndex, Span, TextRange};
use crate::parser::{SyntaxError, SyntaxErrorKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing this diagnostic.
    pub file: FileId,
    pub range: TextRange,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: &'static str,
    pub message: Arc<str>,
    /// The symbol this diagnostic is about, if any.
    pub symbol: Option<SmolStr>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(location: FileRange, code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            file: location.file,
            range: location.range,
            severity: Severity::Error,
            code,
            message: message.into(),
            symbol: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(location: FileRange, code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(location, code, message)
        }
    }

    /// Attach the related symbol name.
    pub fn with_symbol(mut self, name: impl Into<SmolStr>) -> Self {
        self.symbol = Some(name.into());
        self
    }

    pub fn location(&self) -> FileRange {
        FileRange::new(self.file, self.range)
    }

    /// Convert a parser error of a file.
    pub fn from_syntax_error(file: FileId, error: &SyntaxError) -> Self {
        let code = match error.kind {
            SyntaxErrorKind::Unexpected => codes::SYNTAX_ERROR,
            SyntaxErrorKind::Unbalanced => codes::UNBALANCED_BLOCK,
        };
        Self::error(
            FileRange::new(file, error.range),
            code,
            error.message.as_str(),
        )
    }

    /// Line/column span of the diagnostic.
    pub fn span(&self, index: &LineIndex) -> Span {
        index.span(self.range)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Errors (syntax, includes, types, evaluation)
/// - **W0001-W0099**: Warnings (implicit symbols, dropped values, imports)
pub mod codes {
    // ========================================================================
    // ERRORS (E0001-E0099)
    // ========================================================================

    /// Malformed token or grammar.
    pub const SYNTAX_ERROR: &str = "E0001";
    /// `menu`/`choice`/`if` without its closer, or a stray closer.
    pub const UNBALANCED_BLOCK: &str = "E0002";
    /// A file includes itself through a chain of `source` directives.
    pub const INCLUDE_CYCLE: &str = "E0003";
    /// A `source` directive names a file that does not exist.
    pub const MISSING_INCLUDE: &str = "E0004";
    /// A symbol is redeclared with a different type.
    pub const TYPE_CONFLICT: &str = "E0005";
    /// Symbols depend on each other's values.
    pub const CIRCULAR_DEPENDENCY: &str = "E0006";
    /// A comparison between incompatible domains.
    pub const COMPARISON_MISMATCH: &str = "E0007";
    /// A default or range bound that does not fit the symbol type.
    pub const INVALID_VALUE: &str = "E0008";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// A symbol is referenced but never given a type.
    pub const IMPLICIT_DECLARATION: &str = "W0001";
    /// An imported configuration names an unknown symbol.
    pub const UNKNOWN_SYMBOL: &str = "W0002";
    /// A user value was dropped on reparse.
    pub const USER_VALUE_DROPPED: &str = "W0003";
    /// A selected symbol's own dependencies are not met.
    pub const UNMET_DEPENDENCY: &str = "W0004";
    /// `select`/`imply` of a symbol that is not bool or tristate.
    pub const INVALID_SELECT: &str = "W0005";
    /// A `source` path uses an undefined variable.
    pub const UNDEFINED_VARIABLE: &str = "W0006";
    /// An imported configuration line could not be understood.
    pub const INVALID_CONFIG_LINE: &str = "W0007";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during lowering.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Sort by position and drop entries with the same range and message.
pub fn dedup_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.sort_by(|a, b| {
        (a.file, a.range.start(), a.range.end(), &a.message)
            .cmp(&(b.file, b.range.start(), b.range.end(), &b.message))
    });
    diagnostics.dedup_by(|a, b| a.file == b.file && a.range == b.range && a.message == b.message);
}
