//! IDE layer tests
//!
//! Tests for the queries answered from an analysis snapshot:
//! - Completion contexts and ranking
//! - Hover contents
//! - Document outline
//! - Per-file diagnostics

pub mod tests_completion;
pub mod tests_diagnostics;
pub mod tests_hover;
pub mod tests_symbols;
