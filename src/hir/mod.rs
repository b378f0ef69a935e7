//! High-level IR (HIR): the semantic model of a Kconfig project.
//!
//! Parsing is a memoized Salsa query per file. Lowering walks the parsed
//! files reachable from the roots and builds the symbol table and the menu
//! tree; the evaluator computes expression values against an environment.
//!
//! ## Layers
//!
//! ```text
//! FileText(file)            ← INPUT: raw source text
//!     │
//!     ▼
//! parse_file(file)          ← Lossless CST + line index (per file, memoized)
//!     │
//!     ▼
//! lower(roots)              ← include resolution, SymbolTable, MenuTree
//!     │
//!     ▼
//! evaluate(expr, env)       ← tristate / typed values
//! ```

mod db;
mod diagnostics;
mod eval;
mod expr;
mod lower;
mod menu;
mod symbols;
mod types;

pub use db::{FileText, ParseResult, RootDatabase, parse_file};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes, dedup_diagnostics};
pub use eval::{Environment, EvalIssue, Evaluated, evaluate, evaluate_value};
pub use expr::{CmpOp, Expr, Literal};
pub use lower::{LoweredProject, SourceDb, lower};
pub use menu::{MenuId, MenuKind, MenuNode, MenuTree};
pub use symbols::{
    Choice, ChoiceDefault, ChoiceId, DefaultValue, Definition, Forward, Prompt, RangeClause,
    ReverseDependency, ReverseKind, Symbol, SymbolTable,
};
pub use types::{SymbolType, Tristate, Value, parse_hex, parse_number};
