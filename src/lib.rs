//! # kconfig-base
//!
//! Core library for Kconfig parsing, evaluation, and IDE queries.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! server    → Concurrent workspace, line-delimited JSON RPC
//!   ↓
//! ide       → Change coordinator, snapshots, completion, hover, outline
//!   ↓
//! model     → Evaluated configuration, dependency graph, .config I/O
//!   ↓
//! hir       → Salsa parse query, symbol table, menu tree, evaluator
//!   ↓
//! project   → File access, include resolution, workspace settings
//!   ↓
//! parser    → Logos lexer, rowan CST, recursive-descent grammar
//!   ↓
//! base      → Primitives (FileId, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → project → hir → model → ide → server)
// ============================================================================

/// Foundation types: FileId, TextRange, LineIndex
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, typed AST
pub mod parser;

/// Project management: file access, includes, settings
pub mod project;

/// High-level IR: Salsa-based semantic model
pub mod hir;

/// Evaluated configuration and incremental re-evaluation
pub mod model;

/// IDE features: completion, hover, outline, diagnostics
pub mod ide;

/// Workspace concurrency and the RPC front end
pub mod server;

// Re-export commonly needed items
pub use parser::keywords;

// Re-export foundation types
pub use base::{FileId, FileRange, LineIndex, Position, Span, TextRange, TextSize};
