//! Document outline, mirroring the menu tree.

use std::sync::Arc;

use crate::base::{FileId, Span};
use crate::hir::{MenuId, MenuKind, MenuNode, SymbolType};

use super::Analysis;

/// Kind of an outline entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutlineKind {
    Config,
    MenuConfig,
    Menu,
    Choice,
    Comment,
    MainMenu,
}

impl OutlineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlineKind::Config => "Config",
            OutlineKind::MenuConfig => "MenuConfig",
            OutlineKind::Menu => "Menu",
            OutlineKind::Choice => "Choice",
            OutlineKind::Comment => "Comment",
            OutlineKind::MainMenu => "MainMenu",
        }
    }

    /// Convert to LSP symbol kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            OutlineKind::Config => 13,     // Variable
            OutlineKind::MenuConfig => 2,  // Module
            OutlineKind::Menu => 3,        // Namespace
            OutlineKind::Choice => 10,     // Enum
            OutlineKind::Comment => 15,    // String
            OutlineKind::MainMenu => 1,    // File
        }
    }
}

/// One entry of the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Arc<str>,
    pub kind: OutlineKind,
    pub detail: Option<Arc<str>>,
    /// The whole entry.
    pub span: Span,
    /// The name or title.
    pub selection_span: Span,
    /// The entry is visible in the current configuration.
    pub active: bool,
    pub children: Vec<SymbolInfo>,
}

/// Get the outline of a file.
///
/// `if` blocks contribute their children directly. Entries that live in
/// other files are left out, but entries of this file nested inside them
/// are kept.
pub fn document_symbols(analysis: &Analysis, file: FileId) -> Vec<SymbolInfo> {
    let mut out = Vec::new();
    if analysis.line_index(file).is_some() && !analysis.menu().is_empty() {
        collect_children(analysis, file, MenuId::ROOT, &mut out);
    }
    out
}

fn collect_children(analysis: &Analysis, file: FileId, parent: MenuId, out: &mut Vec<SymbolInfo>) {
    let menu = analysis.menu();
    for &child in &menu.node(parent).children {
        let node = menu.node(child);
        let kind = outline_kind(node.kind);
        match kind {
            Some(kind) if node.file == file => {
                let mut children = Vec::new();
                collect_children(analysis, file, child, &mut children);
                if let Some(info) = symbol_info(analysis, child, node, kind, children) {
                    out.push(info);
                }
            }
            _ => collect_children(analysis, file, child, out),
        }
    }
}

fn outline_kind(kind: MenuKind) -> Option<OutlineKind> {
    Some(match kind {
        MenuKind::Config => OutlineKind::Config,
        MenuKind::MenuConfig => OutlineKind::MenuConfig,
        MenuKind::Menu => OutlineKind::Menu,
        MenuKind::Choice(_) => OutlineKind::Choice,
        MenuKind::Comment => OutlineKind::Comment,
        MenuKind::MainMenu => OutlineKind::MainMenu,
        MenuKind::Root | MenuKind::If => return None,
    })
}

fn symbol_info(
    analysis: &Analysis,
    id: MenuId,
    node: &MenuNode,
    kind: OutlineKind,
    children: Vec<SymbolInfo>,
) -> Option<SymbolInfo> {
    let index = analysis.line_index(node.file)?;
    let (name, detail) = match node.kind {
        MenuKind::Config | MenuKind::MenuConfig => {
            let name = node.symbol.clone()?;
            let symbol = analysis.symbols().get(&name);
            let ty = symbol.and_then(|s| s.ty).map_or("undeclared", SymbolType::as_str);
            let prompt = symbol
                .and_then(|s| s.definitions.iter().find(|d| d.menu == id))
                .and_then(|d| d.prompt.as_ref())
                .map(|p| p.text.clone());
            let detail = match prompt {
                Some(prompt) => format!("{ty} \"{prompt}\""),
                None => ty.to_string(),
            };
            (name.to_string(), Some(detail))
        }
        MenuKind::Choice(choice) => {
            let choice = analysis.symbols().choice(choice);
            let name = choice
                .name
                .as_ref()
                .map(|n| n.to_string())
                .or_else(|| choice.prompt.as_ref().map(|p| p.text.clone()))
                .unwrap_or_else(|| "choice".to_string());
            (name, choice.prompt.as_ref().map(|p| p.text.clone()))
        }
        _ => (node.prompt.clone().unwrap_or_default(), None),
    };

    Some(SymbolInfo {
        name: Arc::from(name),
        kind,
        detail: detail.map(Arc::from),
        span: index.span(node.range),
        selection_span: index.span(node.name_range),
        active: analysis.model().is_menu_visible(id),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_kind_to_lsp() {
        assert_eq!(OutlineKind::Config.to_lsp(), 13);
        assert_eq!(OutlineKind::Choice.to_lsp(), 10);
        assert_eq!(outline_kind(MenuKind::If), None);
        assert_eq!(outline_kind(MenuKind::Menu), Some(OutlineKind::Menu));
    }
}
