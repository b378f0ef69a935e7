//! Hover information implementation.

use std::fmt::Write as _;

use smol_str::SmolStr;

use crate::base::{FileId, Position, Span};
use crate::hir::{Expr, Symbol, SymbolType};
use crate::model::SymbolEntry;
use crate::parser::SyntaxKind;

use super::Analysis;

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// Name of the hovered symbol.
    pub symbol: SmolStr,
    /// Span of the hovered name.
    pub span: Span,
}

/// Get hover information for a position.
///
/// # Arguments
/// * `analysis` - The snapshot to query
/// * `file` - The file containing the cursor
/// * `position` - Cursor position (0-indexed)
///
/// # Returns
/// Hover information, or None if the cursor is not on a known symbol.
pub fn hover(analysis: &Analysis, file: FileId, position: Position) -> Option<HoverResult> {
    let parse = analysis.parse(file)?;
    let offset = parse.line_index.offset(position);
    let token = parse
        .parse
        .syntax()
        .token_at_offset(offset)
        .find(|t| t.kind() == SyntaxKind::IDENT)?;
    let symbol = analysis.symbols().get(token.text())?;

    Some(HoverResult {
        contents: build_hover_content(analysis, symbol),
        symbol: symbol.name.clone(),
        span: parse.line_index.span(token.text_range()),
    })
}

fn build_hover_content(analysis: &Analysis, symbol: &Symbol) -> String {
    let mut out = String::new();
    let ty = symbol.ty.map_or("undeclared", SymbolType::as_str);
    let _ = writeln!(out, "**{}** `{ty}`", symbol.name);

    for (_, prompt) in symbol.prompts() {
        out.push('\n');
        let _ = write!(out, "\"{}\"", prompt.text);
        if !prompt.cond.is_yes() {
            let _ = write!(out, " if `{}`", prompt.cond);
        }
        out.push('\n');
    }

    if let Some(entry) = analysis.model().get(&symbol.name) {
        out.push('\n');
        out.push_str(&state_line(entry));
        out.push('\n');
    }

    let dependency = symbol.dependency();
    if symbol.is_defined() && !dependency.is_yes() {
        let _ = writeln!(out, "\nDepends on: `{dependency}`");
    }

    let reverse: Vec<String> = symbol
        .reverse_deps
        .iter()
        .map(|rev| with_condition(format!("`{}` ({})", rev.selector, rev.kind.as_str()), &rev.cond))
        .collect();
    if !reverse.is_empty() {
        let _ = writeln!(out, "\nSelected by: {}", reverse.join(", "));
    }

    let forwards: Vec<String> = symbol
        .forwards
        .iter()
        .map(|f| with_condition(format!("{} `{}`", f.kind.as_str(), f.target), &f.cond))
        .collect();
    if !forwards.is_empty() {
        let _ = writeln!(out, "\nSelects: {}", forwards.join(", "));
    }

    let locations: Vec<String> = symbol
        .definitions
        .iter()
        .map(|d| d.location)
        .filter_map(|location| {
            let path = analysis.file_path(location.file)?;
            let line = analysis
                .line_index(location.file)
                .map(|index| index.position(location.range.start()).line + 1)
                .unwrap_or(1);
            Some(format!("`{}:{line}`", path.display()))
        })
        .collect();
    if !locations.is_empty() {
        let _ = writeln!(out, "\nDefined at: {}", locations.join(", "));
    }

    if let Some(help) = &symbol.help {
        out.push_str("\n---\n\n");
        out.push_str(help.trim_end());
        out.push('\n');
    }
    out
}

fn state_line(entry: &SymbolEntry) -> String {
    let value = entry
        .value
        .as_ref()
        .map_or_else(|| "unknown".to_string(), |v| v.to_string());
    let visibility = match (entry.visible, entry.active) {
        (true, _) => "visible",
        (false, true) => "not visible",
        (false, false) => "inactive",
    };
    format!("Value: `{value}` ({}), {visibility}", entry.state.as_str())
}

fn with_condition(text: String, cond: &Expr) -> String {
    if cond.is_yes() {
        text
    } else {
        format!("{text} if `{cond}`")
    }
}
