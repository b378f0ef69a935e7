//! Diagnostic assertions.

use kconfig::hir::Diagnostic;

/// Diagnostics carrying `code`.
pub fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
    diagnostics.iter().filter(|d| d.code == code).collect()
}

/// Asserts exactly one diagnostic with `code` exists and returns it.
pub fn single<'a>(diagnostics: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    let found = with_code(diagnostics, code);
    assert_eq!(
        found.len(),
        1,
        "expected exactly one {code}, got {:#?}",
        diagnostics
    );
    found[0]
}
