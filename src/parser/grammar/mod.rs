//! Grammar for Kconfig parsing
//!
//! - `entries` - Entries, blocks and their attribute lines
//! - `expressions` - Dependency and default expressions
//!
//! The expression functions are generic over [`ExpressionParser`] so they
//! only see the token-level interface of the parser.

mod entries;
mod expressions;

pub(crate) use entries::source_file;
pub(crate) use expressions::ExpressionParser;
