//! The evaluation engine: computes a [`ConfigModel`] from a lowered project.
//!
//! Units are evaluated component by component in dependency order. A pass
//! starts from a previous model and re-evaluates only units reachable from
//! the seed symbols; a unit's readers are scheduled only when its value
//! actually changed.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::graph::{Component, DependencyGraph, Unit};
use super::{ChangeSet, ConfigModel, SymbolEntry, SymbolState, UserValues};
use crate::base::FileRange;
use crate::hir::{
    ChoiceId, Diagnostic, Expr, MenuId, MenuTree, ReverseKind, Symbol, SymbolTable, SymbolType,
    Tristate, Value, codes, evaluate, evaluate_value,
};

/// The pass was abandoned because its token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("evaluation cancelled")]
pub struct Cancelled;

/// Where a pass starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seeds {
    All,
    /// Symbols whose definition or user value changed.
    Names(Vec<SmolStr>),
}

pub struct Engine<'a> {
    symbols: &'a SymbolTable,
    menu: &'a MenuTree,
    graph: &'a DependencyGraph,
    max_iterations: usize,
}

impl<'a> Engine<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        menu: &'a MenuTree,
        graph: &'a DependencyGraph,
        max_iterations: usize,
    ) -> Self {
        Self {
            symbols,
            menu,
            graph,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Evaluate everything from scratch.
    pub fn evaluate_all(
        &self,
        user: &UserValues,
        cancel: &CancellationToken,
    ) -> Result<ConfigModel, Cancelled> {
        self.update(&ConfigModel::new(), user, &Seeds::All, true, cancel)
            .map(|(model, _)| model)
    }

    /// Derive a new model from `previous`.
    ///
    /// Entries of symbols not reached from `seeds` are copied by name.
    /// `rebuild_menu` recomputes every menu node instead of only those
    /// reading a changed symbol.
    pub fn update(
        &self,
        previous: &ConfigModel,
        user: &UserValues,
        seeds: &Seeds,
        rebuild_menu: bool,
        cancel: &CancellationToken,
    ) -> Result<(ConfigModel, ChangeSet), Cancelled> {
        let mut entries: IndexMap<SmolStr, SymbolEntry, FxBuildHasher> =
            IndexMap::with_capacity_and_hasher(self.symbols.len(), FxBuildHasher);
        for symbol in self.symbols.iter() {
            let mut entry = previous
                .get(&symbol.name)
                .filter(|e| e.ty == symbol.ty)
                .cloned()
                .unwrap_or_else(|| SymbolEntry::new(symbol.name.clone(), symbol.ty));
            entry.user = user.get(&symbol.name).cloned();
            entries.insert(symbol.name.clone(), entry);
        }
        let menu_visible = if rebuild_menu {
            Vec::new()
        } else {
            previous.menu_visible().to_vec()
        };
        let mut model = ConfigModel::from_parts(entries, menu_visible);

        let mut dirty = vec![false; self.graph.unit_count()];
        match seeds {
            Seeds::All => dirty.iter_mut().for_each(|d| *d = true),
            Seeds::Names(names) => {
                for name in names {
                    match self.symbols.index_of(name) {
                        Some(index) => {
                            if let Some(unit) = self.graph.unit_of_symbol(index) {
                                dirty[unit] = true;
                            }
                        }
                        None => {
                            for &reader in self.graph.readers(name) {
                                dirty[reader] = true;
                            }
                        }
                    }
                }
            }
        }

        let mut changed_values: Vec<SmolStr> = Vec::new();
        let mut evaluated = 0usize;
        for component in self.graph.components() {
            if !component.units.iter().any(|&u| dirty[u]) {
                continue;
            }
            if cancel.is_cancelled() {
                debug!(evaluated, "evaluation pass cancelled");
                return Err(Cancelled);
            }
            evaluated += component.units.len();
            for name in self.evaluate_component(component, &mut model) {
                let before = previous.get(&name);
                let after = model.get(&name);
                let differs = match (before, after) {
                    (Some(b), Some(a)) => b.ty != a.ty || b.value != a.value,
                    _ => true,
                };
                if differs {
                    for &reader in self.graph.readers(&name) {
                        dirty[reader] = true;
                    }
                    changed_values.push(name);
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        self.update_menu(&mut model, &changed_values, rebuild_menu);

        let changes = ChangeSet::between(previous, &model);
        debug!(
            evaluated,
            units = self.graph.unit_count(),
            changed = changes.len(),
            "evaluation pass finished"
        );
        Ok((model, changes))
    }

    /// Evaluate one component; returns the names of its symbols.
    fn evaluate_component(&self, component: &Component, model: &mut ConfigModel) -> Vec<SmolStr> {
        let names: Vec<SmolStr> = component
            .units
            .iter()
            .flat_map(|&u| self.unit_symbols(u))
            .collect();

        if !component.cyclic {
            for &unit in &component.units {
                self.evaluate_unit(unit, model);
            }
            return names;
        }

        for name in &names {
            if let Some(entry) = model.entry_mut(name) {
                entry.value = entry.ty.map(Value::zero);
            }
        }
        let mut converged = false;
        for iteration in 0..self.max_iterations {
            let before: Vec<Option<Value>> = names
                .iter()
                .map(|n| model.get(n).and_then(|e| e.value.clone()))
                .collect();
            for &unit in &component.units {
                self.evaluate_unit(unit, model);
            }
            let after: Vec<Option<Value>> = names
                .iter()
                .map(|n| model.get(n).and_then(|e| e.value.clone()))
                .collect();
            if before == after {
                trace!(iteration, symbols = names.len(), "cycle converged");
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(symbols = ?names, "dependency cycle did not stabilise");
            for name in &names {
                if let Some(entry) = model.entry_mut(name) {
                    entry.value = None;
                    entry.state = SymbolState::Unresolved;
                }
            }
        }
        names
    }

    fn unit_symbols(&self, unit: usize) -> Vec<SmolStr> {
        match self.graph.unit(unit) {
            Unit::Symbol(index) => self
                .symbols
                .by_index(index)
                .map(|s| vec![s.name.clone()])
                .unwrap_or_default(),
            Unit::Choice(choice) => self.symbols.choice(choice).members.clone(),
        }
    }

    fn evaluate_unit(&self, unit: usize, model: &mut ConfigModel) {
        match self.graph.unit(unit) {
            Unit::Symbol(index) => {
                let Some(symbol) = self.symbols.by_index(index) else {
                    return;
                };
                let entry = self.calc_symbol(symbol, model);
                trace!(symbol = %symbol.name, value = ?entry.value, "evaluated symbol");
                if let Some(slot) = model.entry_at_mut(index) {
                    *slot = entry;
                }
            }
            Unit::Choice(choice) => {
                for entry in self.calc_choice(choice, model) {
                    trace!(symbol = %entry.name, value = ?entry.value, "evaluated choice member");
                    let name = entry.name.clone();
                    if let Some(slot) = model.entry_mut(&name) {
                        *slot = entry;
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------------

    fn tri(
        &self,
        expr: &Expr,
        at: FileRange,
        symbol: &str,
        model: &ConfigModel,
        issues: &mut Vec<Diagnostic>,
    ) -> Tristate {
        let result = evaluate(expr, model);
        issues.extend(
            result
                .issues
                .into_iter()
                .map(|i| Diagnostic::error(at, i.code, i.message).with_symbol(symbol)),
        );
        result.value
    }

    fn typed(
        &self,
        expr: &Expr,
        ty: SymbolType,
        at: FileRange,
        symbol: &str,
        model: &ConfigModel,
        issues: &mut Vec<Diagnostic>,
    ) -> Option<Value> {
        let result = evaluate_value(expr, ty, model);
        issues.extend(
            result
                .issues
                .into_iter()
                .map(|i| Diagnostic::error(at, i.code, i.message).with_symbol(symbol)),
        );
        result.value
    }

    /// Per-definition dependency values, their disjunction, and prompt
    /// visibility.
    fn visibility(
        &self,
        symbol: &Symbol,
        model: &ConfigModel,
        issues: &mut Vec<Diagnostic>,
    ) -> (Vec<Tristate>, Tristate, Tristate) {
        let def_deps: Vec<Tristate> = symbol
            .definitions
            .iter()
            .map(|d| self.tri(&d.dependency, d.location, &symbol.name, model, issues))
            .collect();
        let dep = def_deps.iter().copied().fold(Tristate::No, Tristate::or);

        let mut visible = Tristate::No;
        for (def, dep) in symbol.definitions.iter().zip(&def_deps) {
            let Some(prompt) = &def.prompt else {
                continue;
            };
            let cond = self.tri(&prompt.cond, prompt.location, &symbol.name, model, issues);
            let menu = self.tri(&def.visibility, def.location, &symbol.name, model, issues);
            visible = visible.or(cond.and(*dep).and(menu));
        }
        (def_deps, dep, visible)
    }

    fn calc_symbol(&self, symbol: &Symbol, model: &ConfigModel) -> SymbolEntry {
        let mut entry = SymbolEntry::new(symbol.name.clone(), symbol.ty);
        entry.user = model.get(&symbol.name).and_then(|e| e.user.clone());
        let Some(ty) = symbol.ty else {
            return entry;
        };

        let mut issues = Vec::new();
        let (def_deps, dep, visible) = self.visibility(symbol, model, &mut issues);
        entry.active = dep.is_on();
        entry.visible = visible.is_on();
        entry.state = if entry.user.is_some() {
            SymbolState::UserOverridden
        } else {
            SymbolState::DefaultComputed
        };
        let user = entry
            .user
            .clone()
            .filter(|v| visible.is_on() && v.fits(ty));

        let value = if ty.is_boolean() {
            Value::Tristate(self.calc_tristate(
                symbol,
                ty,
                dep,
                visible,
                user,
                &def_deps,
                model,
                &mut issues,
            ))
        } else {
            self.calc_scalar(symbol, ty, dep, user, &def_deps, model, &mut issues)
        };
        entry.value = Some(value);
        entry.issues = issues;
        entry
    }

    /// Kconfig `sym_calc_value` for bool and tristate symbols.
    #[allow(clippy::too_many_arguments)]
    fn calc_tristate(
        &self,
        symbol: &Symbol,
        ty: SymbolType,
        dep: Tristate,
        visible: Tristate,
        user: Option<Value>,
        def_deps: &[Tristate],
        model: &ConfigModel,
        issues: &mut Vec<Diagnostic>,
    ) -> Tristate {
        let name = symbol.name.as_str();
        let reverse = |kind: ReverseKind, issues: &mut Vec<Diagnostic>| {
            symbol
                .reverse_deps
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| self.tri(&r.expr(), r.location, name, model, issues))
                .fold(Tristate::No, Tristate::or)
        };
        let selected = reverse(ReverseKind::Select, issues);

        let mut value = Tristate::No;
        if let Some(user) = user.and_then(|v| v.as_tristate()) {
            value = user.and(visible);
        } else {
            for default in &symbol.defaults {
                let def_dep = def_deps.get(default.definition).copied().unwrap_or(Tristate::No);
                let guard = self
                    .tri(&default.cond, default.location, name, model, issues)
                    .and(def_dep);
                if guard.is_on() {
                    value = self
                        .tri(&default.value, default.location, name, model, issues)
                        .and(guard);
                    break;
                }
            }
            let implied = reverse(ReverseKind::Imply, issues);
            if implied.is_on() {
                value = value.or(implied).and(dep);
            }
        }

        if selected.is_on() && dep < selected {
            let at = symbol
                .reverse_deps
                .iter()
                .find(|r| r.kind == ReverseKind::Select)
                .map(|r| r.location)
                .or_else(|| symbol.first_location());
            if let Some(at) = at {
                let selectors: Vec<String> = symbol
                    .reverse_deps
                    .iter()
                    .filter(|r| r.kind == ReverseKind::Select)
                    .map(|r| format!("`{}`", r.selector))
                    .collect();
                issues.push(
                    Diagnostic::warning(
                        at,
                        codes::UNMET_DEPENDENCY,
                        format!(
                            "`{name}` is selected by {} but its dependencies `{}` are not met",
                            selectors.join(", "),
                            symbol.dependency()
                        ),
                    )
                    .with_symbol(name),
                );
            }
        }
        value = value.or(selected);

        if value == Tristate::Module && (ty == SymbolType::Bool || self.modules_disabled(model)) {
            value = Tristate::Yes;
        }
        value
    }

    fn modules_disabled(&self, model: &ConfigModel) -> bool {
        match self.symbols.modules_symbol() {
            Some(modules) => model
                .value(modules)
                .and_then(Value::as_tristate)
                .is_none_or(|t| t == Tristate::No),
            None => false,
        }
    }

    /// String, int and hex symbols.
    #[allow(clippy::too_many_arguments)]
    fn calc_scalar(
        &self,
        symbol: &Symbol,
        ty: SymbolType,
        dep: Tristate,
        user: Option<Value>,
        def_deps: &[Tristate],
        model: &ConfigModel,
        issues: &mut Vec<Diagnostic>,
    ) -> Value {
        let name = symbol.name.as_str();
        let mut value = user;
        if value.is_none() {
            for default in &symbol.defaults {
                let def_dep = def_deps.get(default.definition).copied().unwrap_or(Tristate::No);
                let guard = self
                    .tri(&default.cond, default.location, name, model, issues)
                    .and(def_dep);
                if guard.is_on() {
                    value = self.typed(&default.value, ty, default.location, name, model, issues);
                    break;
                }
            }
        }
        let value = value.unwrap_or_else(|| Value::zero(ty));
        if !ty.is_numeric() {
            return value;
        }

        for range in &symbol.ranges {
            let active = self
                .tri(&range.cond, range.location, name, model, issues)
                .and(dep);
            if !active.is_on() {
                continue;
            }
            let low = self.typed(&range.low, ty, range.location, name, model, issues);
            let high = self.typed(&range.high, ty, range.location, name, model, issues);
            if let (Some(low), Some(high)) = (low, high) {
                return clamp(value, &low, &high);
            }
            break;
        }
        value
    }

    // ------------------------------------------------------------------------
    // Choices
    // ------------------------------------------------------------------------

    fn calc_choice(&self, id: ChoiceId, model: &ConfigModel) -> Vec<SymbolEntry> {
        let choice = self.symbols.choice(id);
        let label = choice
            .name
            .clone()
            .or_else(|| choice.members.first().cloned())
            .unwrap_or_default();
        let mut issues = Vec::new();
        let dep = self.tri(&choice.dependency, choice.location, &label, model, &mut issues);
        let prompt = choice
            .prompt
            .as_ref()
            .map(|p| self.tri(&p.cond, p.location, &label, model, &mut issues))
            .unwrap_or(Tristate::Yes);
        let choice_visible = dep.and(prompt).is_on();

        let mut members: Vec<(SymbolEntry, bool)> = Vec::new();
        for name in &choice.members {
            let Some(symbol) = self.symbols.get(name) else {
                continue;
            };
            let mut entry = SymbolEntry::new(symbol.name.clone(), symbol.ty);
            entry.user = model.get(name).and_then(|e| e.user.clone());
            let (_, member_dep, member_visible) = self.visibility(symbol, model, &mut issues);
            entry.active = member_dep.is_on();
            entry.visible = choice_visible && member_visible.is_on();
            entry.state = match (symbol.ty, entry.user.is_some()) {
                (None, _) => SymbolState::Unset,
                (Some(_), true) => SymbolState::UserOverridden,
                (Some(_), false) => SymbolState::DefaultComputed,
            };
            let boolean = symbol.ty.is_some_and(SymbolType::is_boolean);
            members.push((entry, boolean));
        }

        let user_is = |entry: &SymbolEntry, t: Tristate| {
            entry.user.as_ref().and_then(Value::as_tristate) == Some(t)
        };
        let selectable = |entry: &SymbolEntry| entry.visible && !user_is(entry, Tristate::No);
        let mut selected: Option<usize> = None;
        if choice_visible {
            selected = members
                .iter()
                .position(|(e, b)| *b && e.visible && user_is(e, Tristate::Yes));
            if selected.is_none() {
                for default in &choice.defaults {
                    let cond = self.tri(&default.cond, choice.location, &label, model, &mut issues);
                    if !cond.is_on() {
                        continue;
                    }
                    if let Some(i) = members
                        .iter()
                        .position(|(e, b)| *b && e.name == default.target && selectable(e))
                    {
                        selected = Some(i);
                        break;
                    }
                }
            }
            if selected.is_none() && !choice.optional {
                selected = members
                    .iter()
                    .position(|(e, b)| *b && selectable(e))
                    .or_else(|| members.iter().position(|(e, b)| *b && e.visible));
            }
        }

        let mut entries: Vec<SymbolEntry> = members
            .into_iter()
            .enumerate()
            .map(|(i, (mut entry, boolean))| {
                entry.value = match entry.ty {
                    Some(_) if boolean => Some(Value::Tristate(if selected == Some(i) {
                        Tristate::Yes
                    } else {
                        Tristate::No
                    })),
                    Some(ty) => Some(Value::zero(ty)),
                    None => None,
                };
                entry
            })
            .collect();
        if let Some(first) = entries.first_mut() {
            first.issues = issues;
        }
        entries
    }

    // ------------------------------------------------------------------------
    // Menu visibility
    // ------------------------------------------------------------------------

    fn update_menu(&self, model: &mut ConfigModel, changed: &[SmolStr], rebuild: bool) {
        let full = rebuild || model.menu_visible().len() != self.menu.len();
        let roots: FxHashSet<MenuId> = if full {
            FxHashSet::default()
        } else {
            changed
                .iter()
                .flat_map(|name| self.graph.menu_refs(name).iter().copied())
                .collect()
        };
        if !full && roots.is_empty() {
            return;
        }

        let mut visible = std::mem::take(model.menu_visible_mut());
        visible.resize(self.menu.len(), false);
        let mut dirty = vec![full; self.menu.len()];
        for (id, node) in self.menu.iter() {
            let parent = node.parent.map(|p| p.index());
            if !full && !roots.contains(&id) && !parent.is_some_and(|p| dirty[p]) {
                continue;
            }
            dirty[id.index()] = true;
            let parent_visible = parent.is_none_or(|p| visible[p]);
            let own = [&node.dependency, &node.visible_if, &node.prompt_cond]
                .into_iter()
                .map(|expr| evaluate(expr, model).value)
                .fold(Tristate::Yes, Tristate::and);
            visible[id.index()] = parent_visible && own.is_on();
        }
        *model.menu_visible_mut() = visible;
    }
}

fn clamp(value: Value, low: &Value, high: &Value) -> Value {
    let (Some(v), Some(lo), Some(hi)) = (value.as_number(), low.as_number(), high.as_number())
    else {
        return value;
    };
    if v < lo {
        low.clone()
    } else if v > hi {
        high.clone()
    } else {
        value
    }
}
