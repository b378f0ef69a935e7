//! Parser tests: lexing, grammar, recovery and the typed AST.

pub mod tests_entries;
pub mod tests_recovery;
