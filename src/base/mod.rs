//! Foundation types for the Kconfig toolchain.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`FileId`] - Interned file identifiers
//! - [`FileRange`] - A byte range inside a specific file
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineIndex`] - Offset to line/column conversion
//! - [`Position`], [`Span`] - Line/column positions for IDE results
//!
//! This module has NO dependencies on other kconfig modules.

mod file_id;
mod line_index;
mod position;

pub use file_id::{FileId, FileRange};
pub use line_index::LineIndex;
pub use position::{Position, Span};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
