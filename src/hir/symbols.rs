//! Symbol table: every name seen while lowering, declared or implicit.
//!
//! Clause lists keep source order: the first matching default wins.
//! Reverse dependencies (`select`/`imply`) are stored on their target.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHasher};
use smol_str::SmolStr;

use super::diagnostics::{Diagnostic, codes};
use super::expr::Expr;
use super::menu::MenuId;
use super::types::SymbolType;
use crate::base::FileRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChoiceId(u32);

impl ChoiceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub cond: Expr,
    pub location: FileRange,
}

/// One `config`/`menuconfig` entry for a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub menu: MenuId,
    /// The symbol name in the entry header.
    pub location: FileRange,
    pub prompt: Option<Prompt>,
    /// Conjunction of the entry's own `depends on` lines.
    pub depends: Expr,
    /// `depends` and everything inherited from enclosing blocks.
    pub dependency: Expr,
    /// Inherited `visible if` conditions.
    pub visibility: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub value: Expr,
    pub cond: Expr,
    /// Index into [`Symbol::definitions`].
    pub definition: usize,
    pub location: FileRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReverseKind {
    Select,
    Imply,
}

impl ReverseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReverseKind::Select => "select",
            ReverseKind::Imply => "imply",
        }
    }
}

/// `selector` selects or implies the symbol this is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseDependency {
    pub selector: SmolStr,
    pub cond: Expr,
    pub kind: ReverseKind,
    pub location: FileRange,
}

impl ReverseDependency {
    /// `selector && cond`.
    pub fn expr(&self) -> Expr {
        Expr::symbol(self.selector.clone()).and(self.cond.clone())
    }
}

/// An outgoing `select`/`imply` of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    pub target: SmolStr,
    pub cond: Expr,
    pub kind: ReverseKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeClause {
    pub low: Expr,
    pub high: Expr,
    pub cond: Expr,
    pub location: FileRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    pub ty: Option<SymbolType>,
    pub ty_location: Option<FileRange>,
    pub definitions: Vec<Definition>,
    pub defaults: Vec<DefaultValue>,
    pub reverse_deps: Vec<ReverseDependency>,
    pub forwards: Vec<Forward>,
    pub ranges: Vec<RangeClause>,
    /// Every place the name is used in an expression or select.
    pub references: Vec<FileRange>,
    pub help: Option<String>,
    pub choice: Option<ChoiceId>,
    pub is_modules: bool,
}

impl Symbol {
    fn new(name: SmolStr) -> Self {
        Self {
            name,
            ty: None,
            ty_location: None,
            definitions: Vec::new(),
            defaults: Vec::new(),
            reverse_deps: Vec::new(),
            forwards: Vec::new(),
            ranges: Vec::new(),
            references: Vec::new(),
            help: None,
            choice: None,
            is_modules: false,
        }
    }

    /// Declared by at least one `config` entry.
    pub fn is_defined(&self) -> bool {
        !self.definitions.is_empty()
    }

    /// Disjunction of all definitions' dependencies; `n` when undefined.
    pub fn dependency(&self) -> Expr {
        self.definitions
            .iter()
            .map(|d| d.dependency.clone())
            .reduce(Expr::or)
            .unwrap_or(Expr::Const(super::types::Tristate::No))
    }

    pub fn prompts(&self) -> impl Iterator<Item = (&Definition, &Prompt)> + '_ {
        self.definitions
            .iter()
            .filter_map(|d| d.prompt.as_ref().map(|p| (d, p)))
    }

    pub fn first_location(&self) -> Option<FileRange> {
        self.definitions
            .first()
            .map(|d| d.location)
            .or_else(|| self.references.first().copied())
    }

    /// Every symbol this one's value reads.
    pub fn inputs(&self) -> Vec<SmolStr> {
        let mut exprs: Vec<&Expr> = Vec::new();
        for def in &self.definitions {
            exprs.push(&def.dependency);
            exprs.push(&def.visibility);
            if let Some(prompt) = &def.prompt {
                exprs.push(&prompt.cond);
            }
        }
        for default in &self.defaults {
            exprs.push(&default.value);
            exprs.push(&default.cond);
        }
        for range in &self.ranges {
            exprs.extend([&range.low, &range.high, &range.cond]);
        }
        for rev in &self.reverse_deps {
            exprs.push(&rev.cond);
        }

        let mut names: Vec<SmolStr> = Vec::new();
        for rev in &self.reverse_deps {
            if !names.contains(&rev.selector) {
                names.push(rev.selector.clone());
            }
        }
        for expr in exprs {
            for name in expr.symbols() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Hash over everything that affects evaluation.
    pub fn fingerprint(&self, hasher: &mut FxHasher) {
        self.name.hash(hasher);
        self.ty.hash(hasher);
        self.choice.hash(hasher);
        self.is_modules.hash(hasher);
        for def in &self.definitions {
            def.dependency.to_string().hash(hasher);
            def.visibility.to_string().hash(hasher);
            if let Some(prompt) = &def.prompt {
                prompt.text.hash(hasher);
                prompt.cond.to_string().hash(hasher);
            }
        }
        for default in &self.defaults {
            default.value.to_string().hash(hasher);
            default.cond.to_string().hash(hasher);
            default.definition.hash(hasher);
        }
        for range in &self.ranges {
            range.low.to_string().hash(hasher);
            range.high.to_string().hash(hasher);
            range.cond.to_string().hash(hasher);
        }
        for rev in &self.reverse_deps {
            rev.selector.hash(hasher);
            rev.kind.hash(hasher);
            rev.cond.to_string().hash(hasher);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDefault {
    pub target: SmolStr,
    pub cond: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: Option<SmolStr>,
    /// Defaults to the first member's type.
    pub ty: Option<SymbolType>,
    pub prompt: Option<Prompt>,
    pub optional: bool,
    pub defaults: Vec<ChoiceDefault>,
    pub members: Vec<SmolStr>,
    pub menu: MenuId,
    pub dependency: Expr,
    pub location: FileRange,
    pub help: Option<String>,
}

impl Choice {
    /// Every symbol the choice's own clauses read.
    pub fn inputs(&self) -> Vec<SmolStr> {
        let mut names = self.dependency.symbols();
        let mut extra: Vec<SmolStr> = Vec::new();
        if let Some(prompt) = &self.prompt {
            extra.extend(prompt.cond.symbols());
        }
        for default in &self.defaults {
            extra.push(default.target.clone());
            extra.extend(default.cond.symbols());
        }
        for name in extra {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn fingerprint(&self, hasher: &mut FxHasher) {
        self.ty.hash(hasher);
        self.optional.hash(hasher);
        self.members.hash(hasher);
        self.dependency.to_string().hash(hasher);
        if let Some(prompt) = &self.prompt {
            prompt.text.hash(hasher);
            prompt.cond.to_string().hash(hasher);
        }
        for default in &self.defaults {
            default.target.hash(hasher);
            default.cond.to_string().hash(hasher);
        }
    }
}

/// All symbols and choices of a lowered project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: IndexMap<SmolStr, Symbol, FxBuildHasher>,
    choices: Vec<Choice>,
    modules: Option<SmolStr>,
    diagnostics: Vec<Diagnostic>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut Symbol {
        self.symbols
            .entry(SmolStr::new(name))
            .or_insert_with_key(|key| Symbol::new(key.clone()))
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Register a type for `name`, or check it against the first declaration.
    ///
    /// A conflicting type is reported and ignored.
    pub fn declare(&mut self, name: &str, ty: SymbolType, location: FileRange) {
        let symbol = self.entry(name);
        match symbol.ty {
            None => {
                symbol.ty = Some(ty);
                symbol.ty_location = Some(location);
            }
            Some(existing) if existing != ty => {
                let message =
                    format!("`{name}` is declared as {ty} here but was declared as {existing}");
                self.diagnostics.push(
                    Diagnostic::error(location, codes::TYPE_CONFLICT, message).with_symbol(name),
                );
            }
            Some(_) => {}
        }
    }

    /// Add a `config` entry for `name`. Returns the definition index.
    pub fn add_definition(&mut self, name: &str, definition: Definition) -> usize {
        let symbol = self.entry(name);
        symbol.definitions.push(definition);
        symbol.definitions.len() - 1
    }

    pub fn set_prompt(&mut self, name: &str, definition: usize, prompt: Prompt) {
        if let Some(def) = self.entry(name).definitions.get_mut(definition) {
            def.prompt = Some(prompt);
        }
    }

    /// Append a guarded default; earlier defaults take priority.
    pub fn add_default(
        &mut self,
        name: &str,
        value: Expr,
        cond: Expr,
        definition: usize,
        location: FileRange,
    ) {
        self.entry(name).defaults.push(DefaultValue {
            value,
            cond,
            definition,
            location,
        });
    }

    /// Conjoin a `depends on` expression onto one definition.
    pub fn add_dependency(&mut self, name: &str, definition: usize, expr: Expr) {
        if let Some(def) = self.entry(name).definitions.get_mut(definition) {
            def.depends = std::mem::replace(&mut def.depends, Expr::yes()).and(expr.clone());
            def.dependency = std::mem::replace(&mut def.dependency, Expr::yes()).and(expr);
        }
    }

    /// Record that `selector` selects or implies `target` under `cond`.
    pub fn add_reverse_dependency(
        &mut self,
        target: &str,
        selector: &str,
        cond: Expr,
        kind: ReverseKind,
        location: FileRange,
    ) {
        self.entry(selector).forwards.push(Forward {
            target: target.into(),
            cond: cond.clone(),
            kind,
        });
        self.entry(target).reverse_deps.push(ReverseDependency {
            selector: selector.into(),
            cond,
            kind,
            location,
        });
    }

    pub fn add_range(&mut self, name: &str, range: RangeClause) {
        self.entry(name).ranges.push(range);
    }

    /// Register a use of `name`; the name becomes known even if never declared.
    pub fn add_reference(&mut self, name: &str, location: FileRange) {
        self.entry(name).references.push(location);
    }

    pub fn set_help(&mut self, name: &str, help: String) {
        self.entry(name).help.get_or_insert(help);
    }

    pub fn mark_modules(&mut self, name: &str) {
        self.entry(name).is_modules = true;
        self.modules.get_or_insert_with(|| name.into());
    }

    pub fn add_choice(&mut self, choice: Choice) -> ChoiceId {
        self.choices.push(choice);
        ChoiceId(self.choices.len() as u32 - 1)
    }

    /// A named choice defined earlier; named choices may be extended.
    pub fn find_choice(&self, name: &str) -> Option<ChoiceId> {
        self.choices
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
            .map(|i| ChoiceId(i as u32))
    }

    pub fn choice_mut(&mut self, id: ChoiceId) -> &mut Choice {
        &mut self.choices[id.index()]
    }

    pub fn add_choice_member(&mut self, id: ChoiceId, name: &str) {
        let choice = &mut self.choices[id.index()];
        if !choice.members.iter().any(|m| m == name) {
            choice.members.push(name.into());
        }
        self.entry(name).choice = Some(id);
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Second resolution phase, run once every file is lowered.
    ///
    /// Reports names that never got a type, and selects of non-boolean
    /// symbols. Choices without a type take their first member's.
    pub fn finish(&mut self) {
        for symbol in self.symbols.values() {
            if symbol.ty.is_none() {
                let location = symbol
                    .definitions
                    .first()
                    .map(|d| d.location)
                    .or_else(|| symbol.references.first().copied());
                if let Some(location) = location {
                    let message = if symbol.is_defined() {
                        format!("`{}` has no type", symbol.name)
                    } else {
                        format!("implicit declaration of `{}`", symbol.name)
                    };
                    self.diagnostics.push(
                        Diagnostic::warning(location, codes::IMPLICIT_DECLARATION, message)
                            .with_symbol(symbol.name.clone()),
                    );
                }
            }
            if let Some(ty) = symbol.ty.filter(|t| !t.is_boolean()) {
                for rev in &symbol.reverse_deps {
                    let message = format!(
                        "`{}` cannot {} `{}`: it is {ty}, not bool or tristate",
                        rev.selector,
                        rev.kind.as_str(),
                        symbol.name
                    );
                    self.diagnostics.push(
                        Diagnostic::warning(rev.location, codes::INVALID_SELECT, message)
                            .with_symbol(symbol.name.clone()),
                    );
                }
            }
        }

        for choice in &mut self.choices {
            if choice.ty.is_none() {
                choice.ty = choice
                    .members
                    .iter()
                    .find_map(|m| self.symbols.get(m).and_then(|s| s.ty));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Case-sensitive O(1) lookup.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Symbols in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.symbols.get_index_of(name)
    }

    pub fn by_index(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get_index(index).map(|(_, s)| s)
    }

    pub fn choice(&self, id: ChoiceId) -> &Choice {
        &self.choices[id.index()]
    }

    pub fn choices(&self) -> impl Iterator<Item = (ChoiceId, &Choice)> + '_ {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, c)| (ChoiceId(i as u32), c))
    }

    /// The symbol marked with `option modules`.
    pub fn modules_symbol(&self) -> Option<&str> {
        self.modules.as_deref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Per-symbol semantic fingerprints, including the owning choice.
    pub fn fingerprints(&self) -> IndexMap<SmolStr, u64, FxBuildHasher> {
        self.symbols
            .values()
            .map(|symbol| {
                let mut hasher = FxHasher::default();
                symbol.fingerprint(&mut hasher);
                if let Some(choice) = symbol.choice {
                    self.choice(choice).fingerprint(&mut hasher);
                }
                (symbol.name.clone(), hasher.finish())
            })
            .collect()
    }
}
