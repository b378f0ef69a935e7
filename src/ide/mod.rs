//! IDE features: High-level APIs for the server.
//!
//! This module provides the interface between the evaluated model and the
//! request handlers. Each function corresponds to one request.
//!
//! ## Design Principles
//!
//! 1. **Snapshots**: Queries read an immutable [`Analysis`]
//! 2. **No protocol types**: Uses our own types, converted at the server boundary
//! 3. **One writer**: Every change goes through [`AnalysisHost`]
//!
//! ## Usage
//!
//! ```ignore
//! use kconfig::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new(config, access);
//! let file = host.set_file_text(Path::new("Kconfig"), text);
//! host.reparse(&CancellationToken::new())?;
//!
//! let analysis = host.analysis();
//! let symbols = analysis.document_symbols(file);
//! ```

mod analysis;
mod completion;
mod diagnostics;
mod hover;
mod symbols;
pub mod text_utils;

pub use analysis::{Analysis, AnalysisHost, ChangeError, ImportOutcome};
pub use completion::{CompletionItem, CompletionKind, completions};
pub use diagnostics::file_diagnostics;
pub use hover::{HoverResult, hover};
pub use symbols::{OutlineKind, SymbolInfo, document_symbols};
pub use text_utils::extract_word_at_cursor;
