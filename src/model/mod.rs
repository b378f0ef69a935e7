//! Configuration model: the evaluated state of every symbol and menu node.
//!
//! A [`ConfigModel`] is an immutable value once built. The [`Engine`]
//! derives a new model from a previous one, re-evaluating only what a
//! change can reach, and reports the symbols that changed.

mod dotconfig;
mod engine;
mod graph;
mod validate;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

use crate::hir::{Diagnostic, Environment, MenuId, SymbolType, Value};

pub use dotconfig::{ConfigLine, ParsedConfig, export_config, parse_config};
pub use engine::{Cancelled, Engine, Seeds};
pub use graph::{Component, DependencyGraph, Unit};
pub use validate::{UserEdit, ValidationError, validate_value};

/// User-assigned values by symbol name.
pub type UserValues = IndexMap<SmolStr, Value, FxBuildHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolState {
    /// Never evaluated, or not a typed symbol.
    Unset,
    DefaultComputed,
    /// A user value is present (it may be ignored while invisible).
    UserOverridden,
    /// Part of a dependency cycle that did not stabilise.
    Unresolved,
}

impl SymbolState {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolState::Unset => "unset",
            SymbolState::DefaultComputed => "default",
            SymbolState::UserOverridden => "user",
            SymbolState::Unresolved => "unresolved",
        }
    }
}

/// Evaluated state of one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: SmolStr,
    pub ty: Option<SymbolType>,
    /// `None` when unknown.
    pub value: Option<Value>,
    pub user: Option<Value>,
    pub state: SymbolState,
    /// A prompt is visible.
    pub visible: bool,
    /// Dependencies are met.
    pub active: bool,
    /// Evaluation diagnostics of the last pass.
    pub issues: Vec<Diagnostic>,
}

impl SymbolEntry {
    pub fn new(name: SmolStr, ty: Option<SymbolType>) -> Self {
        Self {
            name,
            ty,
            value: None,
            user: None,
            state: SymbolState::Unset,
            visible: false,
            active: false,
            issues: Vec::new(),
        }
    }

    /// Same observable state, ignoring diagnostics.
    pub fn same_state(&self, other: &SymbolEntry) -> bool {
        self.ty == other.ty
            && self.value == other.value
            && self.state == other.state
            && self.visible == other.visible
            && self.active == other.active
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigModel {
    entries: IndexMap<SmolStr, SymbolEntry, FxBuildHasher>,
    menu_visible: Vec<bool>,
}

impl ConfigModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).and_then(|e| e.value.as_ref())
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached visibility of a menu node.
    pub fn is_menu_visible(&self, id: MenuId) -> bool {
        self.menu_visible.get(id.index()).copied().unwrap_or(false)
    }

    pub fn issues(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries.values().flat_map(|e| e.issues.iter())
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.entries.get_mut(name)
    }

    pub(crate) fn entry_at_mut(&mut self, index: usize) -> Option<&mut SymbolEntry> {
        self.entries.get_index_mut(index).map(|(_, e)| e)
    }

    pub(crate) fn from_parts(
        entries: IndexMap<SmolStr, SymbolEntry, FxBuildHasher>,
        menu_visible: Vec<bool>,
    ) -> Self {
        Self {
            entries,
            menu_visible,
        }
    }

    pub(crate) fn menu_visible(&self) -> &[bool] {
        &self.menu_visible
    }

    pub(crate) fn menu_visible_mut(&mut self) -> &mut Vec<bool> {
        &mut self.menu_visible
    }
}

impl Environment for ConfigModel {
    fn symbol_type(&self, name: &str) -> Option<SymbolType> {
        self.entries.get(name).and_then(|e| e.ty)
    }

    fn symbol_value(&self, name: &str) -> Option<Value> {
        self.entries.get(name).and_then(|e| e.value.clone())
    }
}

/// Symbols whose observable state changed in one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub symbols: Vec<SmolStr>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.iter().any(|s| s == name)
    }

    /// Compare two models entry by entry.
    pub fn between(before: &ConfigModel, after: &ConfigModel) -> Self {
        let mut symbols: Vec<SmolStr> = after
            .iter()
            .filter(|entry| {
                before
                    .get(&entry.name)
                    .is_none_or(|old| !old.same_state(entry))
            })
            .map(|entry| entry.name.clone())
            .collect();
        symbols.extend(
            before
                .iter()
                .filter(|entry| after.get(&entry.name).is_none())
                .map(|entry| entry.name.clone()),
        );
        Self { symbols }
    }
}
