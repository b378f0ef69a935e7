//! Symbol table contents after lowering.

use kconfig::hir::{SymbolType, Tristate, codes};

use crate::helpers::diagnostic_helpers::{single, with_code};
use crate::helpers::host_helpers::*;

#[test]
fn test_implicit_declaration_reported_once_and_reads_n() {
    let text = "\
config A
\tbool \"a\"
\tdefault y
\tdepends on BAZ

config B
\tbool \"b\"
\tdefault y if BAZ || A

config C
\tbool \"c\"
\tdefault !BAZ
";
    let host = host_from_source(text);
    let analysis = host.analysis();
    let file = root_file(&analysis);

    let diagnostics = analysis.diagnostics(file);
    let implicit = single(&diagnostics, codes::IMPLICIT_DECLARATION);
    assert_eq!(implicit.symbol.as_deref(), Some("BAZ"));

    let baz = analysis.symbols().get("BAZ").unwrap();
    assert_eq!(baz.ty, None);
    assert_eq!(baz.references.len(), 3);

    assert_eq!(tristate(&analysis, "A"), Some(Tristate::No));
    assert_eq!(tristate(&analysis, "B"), Some(Tristate::No));
    assert_eq!(tristate(&analysis, "C"), Some(Tristate::Yes));
}

#[test]
fn test_forward_reference_resolves_type() {
    let host = host_from_source(
        "config A\n\tbool \"a\"\n\tdepends on LATER\nconfig LATER\n\tbool \"later\"\n\tdefault y\n",
    );
    let analysis = host.analysis();
    assert!(with_code(&analysis.project().diagnostics, codes::IMPLICIT_DECLARATION).is_empty());
    assert_eq!(
        analysis.symbols().get("LATER").and_then(|s| s.ty),
        Some(SymbolType::Bool)
    );
    assert!(analysis.model().get("A").unwrap().visible);
}

#[test]
fn test_type_conflict_keeps_first_type() {
    let host = host_from_source("config X\n\tbool \"x\"\n\nconfig X\n\tint\n");
    let analysis = host.analysis();
    single(&analysis.project().diagnostics, codes::TYPE_CONFLICT);
    let x = analysis.symbols().get("X").unwrap();
    assert_eq!(x.ty, Some(SymbolType::Bool));
    assert_eq!(x.definitions.len(), 2);
}

#[test]
fn test_multiple_definitions_merge_dependencies() {
    let host = host_from_source(
        "config X\n\tbool \"x\"\n\tdepends on A\nconfig X\n\tbool\n\tdepends on B\nconfig A\n\tbool\nconfig B\n\tbool\n",
    );
    let analysis = host.analysis();
    let x = analysis.symbols().get("X").unwrap();
    assert_eq!(x.dependency().to_string(), "A || B");
}

#[test]
fn test_select_is_recorded_on_target() {
    let host = host_from_source(
        "config LOG\n\tbool \"log\"\n\tselect PRINTK if EARLY\nconfig PRINTK\n\tbool\nconfig EARLY\n\tbool\n",
    );
    let analysis = host.analysis();
    let printk = analysis.symbols().get("PRINTK").unwrap();
    assert_eq!(printk.reverse_deps.len(), 1);
    assert_eq!(printk.reverse_deps[0].selector, "LOG");
    assert_eq!(printk.reverse_deps[0].cond.to_string(), "EARLY");
}
