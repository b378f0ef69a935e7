//! Dependency graph between evaluation units.
//!
//! A unit is one symbol, or a whole choice with all of its members. Edges
//! point from a unit to the units it reads, so Tarjan's postorder yields
//! dependencies before their readers.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::hir::{ChoiceId, Diagnostic, MenuId, MenuTree, SymbolTable, SymbolType, codes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Index into the symbol table.
    Symbol(usize),
    Choice(ChoiceId),
}

/// A strongly connected group of units, evaluated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub units: Vec<usize>,
    pub cyclic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    units: Vec<Unit>,
    unit_of_symbol: Vec<usize>,
    /// Components in evaluation order.
    components: Vec<Component>,
    component_of_unit: Vec<usize>,
    /// Reverse edges: symbol name → units reading it. Includes names that
    /// are not in the symbol table.
    readers: FxHashMap<SmolStr, Vec<usize>>,
    /// Symbol name → menu nodes whose own conditions read it.
    menu_refs: FxHashMap<SmolStr, Vec<MenuId>>,
    cycles: Vec<Diagnostic>,
}

impl DependencyGraph {
    pub fn build(symbols: &SymbolTable, menu: &MenuTree) -> Self {
        let mut units = Vec::new();
        let mut unit_of_symbol = vec![usize::MAX; symbols.len()];
        let mut choice_units = FxHashMap::default();

        for (index, symbol) in symbols.iter().enumerate() {
            match symbol.choice {
                Some(choice) => {
                    let unit = *choice_units.entry(choice).or_insert_with(|| {
                        units.push(Unit::Choice(choice));
                        units.len() - 1
                    });
                    unit_of_symbol[index] = unit;
                }
                None => {
                    units.push(Unit::Symbol(index));
                    unit_of_symbol[index] = units.len() - 1;
                }
            }
        }

        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(units.len(), units.len());
        let nodes: Vec<NodeIndex> = (0..units.len()).map(|u| graph.add_node(u)).collect();
        let mut readers: FxHashMap<SmolStr, Vec<usize>> = FxHashMap::default();

        let modules = symbols.modules_symbol().map(SmolStr::new);

        for (unit, kind) in units.iter().enumerate() {
            let mut inputs = match kind {
                Unit::Symbol(index) => symbols
                    .by_index(*index)
                    .map(|s| s.inputs())
                    .unwrap_or_default(),
                Unit::Choice(choice) => {
                    let choice = symbols.choice(*choice);
                    let mut inputs = choice.inputs();
                    for member in &choice.members {
                        if let Some(symbol) = symbols.get(member) {
                            for name in symbol.inputs() {
                                if !inputs.contains(&name) {
                                    inputs.push(name);
                                }
                            }
                        }
                    }
                    inputs
                }
            };

            // `m` collapses to `y` while the modules symbol is off.
            if let Some(modules) = &modules {
                let own = symbols.index_of(modules).map(|i| unit_of_symbol[i]) == Some(unit);
                if !own && reads_tristate(symbols, kind) && !inputs.contains(modules) {
                    inputs.push(modules.clone());
                }
            }

            for name in inputs {
                let target = symbols.index_of(&name).map(|i| unit_of_symbol[i]);
                let list = readers.entry(name).or_default();
                if !list.contains(&unit) {
                    list.push(unit);
                }
                match target {
                    // A choice reading its own members is not a cycle.
                    Some(target) if target == unit && matches!(kind, Unit::Choice(_)) => {}
                    Some(target) => {
                        graph.update_edge(nodes[unit], nodes[target], ());
                    }
                    None => {}
                }
            }
        }

        let mut components = Vec::new();
        let mut component_of_unit = vec![0; units.len()];
        let mut cycles = Vec::new();
        for scc in tarjan_scc(&graph) {
            let mut members: Vec<usize> = scc.iter().map(|n| graph[*n]).collect();
            members.sort_unstable();
            let cyclic = members.len() > 1 || graph.contains_edge(scc[0], scc[0]);
            if cyclic {
                cycles.push(cycle_diagnostic(symbols, &units, &members));
            }
            for &unit in &members {
                component_of_unit[unit] = components.len();
            }
            components.push(Component {
                units: members,
                cyclic,
            });
        }

        let mut menu_refs: FxHashMap<SmolStr, Vec<MenuId>> = FxHashMap::default();
        for (id, node) in menu.iter() {
            for name in node.referenced_symbols() {
                menu_refs.entry(name).or_default().push(id);
            }
        }

        tracing::debug!(
            units = units.len(),
            components = components.len(),
            cycles = cycles.len(),
            "built dependency graph"
        );

        Self {
            units,
            unit_of_symbol,
            components,
            component_of_unit,
            readers,
            menu_refs,
            cycles,
        }
    }

    pub fn unit(&self, unit: usize) -> Unit {
        self.units[unit]
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn unit_of_symbol(&self, index: usize) -> Option<usize> {
        self.unit_of_symbol.get(index).copied()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_of_unit(&self, unit: usize) -> usize {
        self.component_of_unit[unit]
    }

    /// Units whose evaluation reads `name`.
    pub fn readers(&self, name: &str) -> &[usize] {
        self.readers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn menu_refs(&self, name: &str) -> &[MenuId] {
        self.menu_refs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One `E0006` per cyclic component.
    pub fn cycle_diagnostics(&self) -> &[Diagnostic] {
        &self.cycles
    }
}

fn reads_tristate(symbols: &SymbolTable, unit: &Unit) -> bool {
    let tristate = |name: &SmolStr| {
        symbols
            .get(name)
            .is_some_and(|s| s.ty == Some(SymbolType::Tristate))
    };
    match unit {
        Unit::Symbol(index) => symbols
            .by_index(*index)
            .is_some_and(|s| s.ty == Some(SymbolType::Tristate)),
        Unit::Choice(choice) => {
            let choice = symbols.choice(*choice);
            choice.ty == Some(SymbolType::Tristate) || choice.members.iter().any(tristate)
        }
    }
}

fn unit_names(symbols: &SymbolTable, unit: Unit) -> Vec<SmolStr> {
    match unit {
        Unit::Symbol(index) => symbols
            .by_index(index)
            .map(|s| vec![s.name.clone()])
            .unwrap_or_default(),
        Unit::Choice(choice) => symbols.choice(choice).members.clone(),
    }
}

fn cycle_diagnostic(symbols: &SymbolTable, units: &[Unit], members: &[usize]) -> Diagnostic {
    let names: Vec<SmolStr> = members
        .iter()
        .flat_map(|&u| unit_names(symbols, units[u]))
        .collect();
    let location = members
        .iter()
        .find_map(|&u| match units[u] {
            Unit::Symbol(index) => symbols.by_index(index).and_then(|s| s.first_location()),
            Unit::Choice(choice) => Some(symbols.choice(choice).location),
        })
        .unwrap_or_else(|| {
            crate::base::FileRange::new(crate::base::FileId::new(0), Default::default())
        });
    let listed: Vec<String> = names.iter().map(|n| format!("`{n}`")).collect();
    let mut diagnostic = Diagnostic::error(
        location,
        codes::CIRCULAR_DEPENDENCY,
        format!("circular dependency between {}", listed.join(", ")),
    );
    if let Some(first) = names.first() {
        diagnostic = diagnostic.with_symbol(first.clone());
    }
    diagnostic
}
