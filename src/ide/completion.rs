//! Completion suggestions implementation.

use std::sync::Arc;

use crate::base::{FileId, Position};
use crate::hir::{Symbol, SymbolType};
use crate::parser::keywords::{ATTRIBUTE_KEYWORDS, ENTRY_KEYWORDS};

use super::Analysis;
use super::text_utils::{inside_comment, inside_string, split_at_word_prefix};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Keyword,
    Symbol,
    Constant,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Keyword => 14,  // Keyword
            CompletionKind::Symbol => 6,    // Variable
            CompletionKind::Constant => 21, // Constant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionKind::Keyword => "keyword",
            CompletionKind::Symbol => "symbol",
            CompletionKind::Constant => "constant",
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Documentation (shown in popup).
    pub documentation: Option<Arc<str>>,
    /// Rank in the result list (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            sort_priority: 0,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the documentation.
    pub fn with_documentation(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    /// Create from a symbol: type and first prompt as detail, help as docs.
    pub fn from_symbol(symbol: &Symbol) -> Self {
        let mut item = Self::new(symbol.name.as_str(), CompletionKind::Symbol);
        let ty = symbol.ty.map_or("undeclared", SymbolType::as_str);
        item.detail = Some(Arc::from(match symbol.prompts().next() {
            Some((_, prompt)) => format!("{ty} \"{}\"", prompt.text),
            None => ty.to_string(),
        }));
        if let Some(help) = &symbol.help {
            item.documentation = Some(Arc::from(help.as_str()));
        }
        item
    }
}

/// Completion context, from the text left of the cursor on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletionContext {
    /// Inside a string, a comment, or after a word that takes no symbol.
    Nothing,
    /// Start of a statement.
    Statement { indented: bool },
    /// Inside an expression: any symbol, plus `y`/`m`/`n`.
    Expression,
    /// After `select`/`imply`: bool and tristate symbols.
    ReverseTarget,
    /// After `config`/`menuconfig`: names used but never declared.
    NewSymbol,
}

/// Get completion suggestions at a position.
///
/// # Arguments
/// * `analysis` - The snapshot to query
/// * `file` - The file containing the cursor
/// * `position` - Cursor position (0-indexed line and character)
///
/// # Returns
/// Suggestions matching the word left of the cursor, best first.
pub fn completions(analysis: &Analysis, file: FileId, position: Position) -> Vec<CompletionItem> {
    let Some(line) = analysis
        .line_index(file)
        .and_then(|index| index.line_text(position.line))
    else {
        return Vec::new();
    };
    let (head, prefix) = split_at_word_prefix(line, position.column as usize);
    let context = determine_context(&head);
    let matches = |label: &str| {
        label
            .to_ascii_lowercase()
            .starts_with(&prefix.to_ascii_lowercase())
    };

    // (group, distance, label) orders the final list.
    let mut ranked: Vec<((u8, u32, Arc<str>), CompletionItem)> = Vec::new();
    let mut push_symbols = |filter: &dyn Fn(&Symbol) -> bool| {
        for symbol in analysis.symbols().iter() {
            if !filter(symbol) || !matches(symbol.name.as_str()) {
                continue;
            }
            let item = CompletionItem::from_symbol(symbol);
            let key = match line_distance(analysis, symbol, file, position.line) {
                Some(distance) => (0, distance, item.label.clone()),
                None => (1, 0, item.label.clone()),
            };
            ranked.push((key, item));
        }
    };

    match context {
        CompletionContext::Nothing => {}
        CompletionContext::Expression => {
            push_symbols(&|s: &Symbol| s.ty.is_some());
            for (label, detail) in [("y", "yes"), ("m", "module"), ("n", "no")] {
                if matches(label) {
                    let item =
                        CompletionItem::new(label, CompletionKind::Constant).with_detail(detail);
                    ranked.push(((2, 0, item.label.clone()), item));
                }
            }
        }
        CompletionContext::ReverseTarget => {
            push_symbols(&|s: &Symbol| s.ty.is_some_and(SymbolType::is_boolean));
        }
        CompletionContext::NewSymbol => {
            push_symbols(&|s: &Symbol| s.ty.is_none());
        }
        CompletionContext::Statement { indented } => {
            let (first, second) = if indented {
                (ATTRIBUTE_KEYWORDS, ENTRY_KEYWORDS)
            } else {
                (ENTRY_KEYWORDS, ATTRIBUTE_KEYWORDS)
            };
            for (index, &(label, detail)) in first.iter().chain(second).enumerate() {
                if matches(label) {
                    let item =
                        CompletionItem::new(label, CompletionKind::Keyword).with_detail(detail);
                    ranked.push(((3, index as u32, item.label.clone()), item));
                }
            }
        }
    }

    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    ranked.dedup_by(|a, b| a.1.label == b.1.label);
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (_, mut item))| {
            item.sort_priority = rank as u32;
            item
        })
        .collect()
}

const EXPRESSION_KEYWORDS: &[&str] = &["on", "if", "default", "def_bool", "def_tristate", "range"];
const EXPRESSION_OPERATORS: &[&str] = &["&&", "||", "!", "(", "=", "!=", "<", "<=", ">", ">="];

fn determine_context(head: &str) -> CompletionContext {
    if inside_string(head) || inside_comment(head) {
        return CompletionContext::Nothing;
    }
    let words: Vec<&str> = head.split_whitespace().collect();
    let Some(&first) = words.first() else {
        return CompletionContext::Statement {
            indented: head.starts_with([' ', '\t']),
        };
    };
    if words.iter().any(|w| EXPRESSION_KEYWORDS.contains(w)) {
        return CompletionContext::Expression;
    }
    // An operator continues an expression started on a continued line.
    if words.last().is_some_and(|w| EXPRESSION_OPERATORS.contains(w)) {
        return CompletionContext::Expression;
    }
    match (first, words.len()) {
        ("select" | "imply", 1) => CompletionContext::ReverseTarget,
        ("config" | "menuconfig", 1) => CompletionContext::NewSymbol,
        _ => CompletionContext::Nothing,
    }
}

/// Smallest line distance between the cursor and a definition or use of
/// the symbol in `file`.
fn line_distance(analysis: &Analysis, symbol: &Symbol, file: FileId, line: u32) -> Option<u32> {
    let index = analysis.line_index(file)?;
    symbol
        .definitions
        .iter()
        .map(|d| d.location)
        .chain(symbol.references.iter().copied())
        .filter(|location| location.file == file)
        .map(|location| index.position(location.range.start()).line.abs_diff(line))
        .min()
}
