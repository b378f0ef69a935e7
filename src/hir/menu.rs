//! The menu tree: presentation structure of all lowered files.
//!
//! Nodes live in an arena in pre-order, so every parent has a smaller id
//! than its children. Symbols are referenced by name.

use smol_str::SmolStr;

use super::expr::Expr;
use super::symbols::ChoiceId;
use crate::base::{FileId, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuId(u32);

impl MenuId {
    pub const ROOT: MenuId = MenuId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Root,
    Config,
    MenuConfig,
    Menu,
    Choice(ChoiceId),
    Comment,
    If,
    MainMenu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub parent: Option<MenuId>,
    pub children: Vec<MenuId>,
    pub kind: MenuKind,
    /// Symbol declared by a config entry.
    pub symbol: Option<SmolStr>,
    pub file: FileId,
    /// Whole entry, for outline ranges.
    pub range: TextRange,
    /// Name or title, for outline selection ranges.
    pub name_range: TextRange,
    pub prompt: Option<String>,
    pub prompt_cond: Expr,
    /// Own dependency conjoined with all inherited ones.
    pub dependency: Expr,
    pub visible_if: Expr,
}

impl MenuNode {
    /// Symbols referenced by the node's own conditions.
    pub fn referenced_symbols(&self) -> Vec<SmolStr> {
        let mut names = self.dependency.symbols();
        for expr in [&self.visible_if, &self.prompt_cond] {
            for name in expr.symbols() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
    title: Option<String>,
}

impl MenuTree {
    pub fn new(root_file: FileId) -> Self {
        Self {
            nodes: vec![MenuNode {
                parent: None,
                children: Vec::new(),
                kind: MenuKind::Root,
                symbol: None,
                file: root_file,
                range: TextRange::default(),
                name_range: TextRange::default(),
                prompt: None,
                prompt_cond: Expr::yes(),
                dependency: Expr::yes(),
                visible_if: Expr::yes(),
            }],
            title: None,
        }
    }

    /// Append a node as the last child of its parent.
    pub fn push(&mut self, node: MenuNode) -> MenuId {
        let id = MenuId(self.nodes.len() as u32);
        if let Some(parent) = node.parent {
            self.nodes[parent.index()].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: MenuId) -> &MenuNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: MenuId) -> &mut MenuNode {
        &mut self.nodes[id.index()]
    }

    pub fn root(&self) -> &MenuNode {
        &self.nodes[0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// All nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (MenuId, &MenuNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (MenuId(i as u32), n))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: String) {
        self.title.get_or_insert(title);
    }
}
