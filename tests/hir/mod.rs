//! HIR layer tests
//!
//! Tests for lowering a workspace into the semantic model:
//! - Include resolution through the file-access collaborator
//! - Symbol table construction and implicit declarations
//! - Lowering diagnostics

pub mod tests_includes;
pub mod tests_symbols;
