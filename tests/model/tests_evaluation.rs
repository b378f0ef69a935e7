//! Evaluation through the change coordinator.

use std::path::Path;

use kconfig::hir::{Tristate, Value, codes};
use kconfig::ide::ChangeError;
use kconfig::model::{SymbolState, ValidationError};
use tokio_util::sync::CancellationToken;

use crate::helpers::diagnostic_helpers::{single, with_code};
use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::{BOARD, CHOICE_ABC, FOO_BAR};

#[test]
fn test_dependency_controls_visibility() {
    let mut host = host_from_source(FOO_BAR);
    let analysis = host.analysis();
    assert_eq!(tristate(&analysis, "FOO"), Some(Tristate::No));
    let bar = analysis.model().get("BAR").unwrap();
    assert!(!bar.visible);
    assert!(!bar.active);

    set(&mut host, "FOO", "y");
    let analysis = host.analysis();
    assert!(analysis.model().get("BAR").unwrap().visible);
    assert_eq!(
        analysis.model().get("FOO").unwrap().state,
        SymbolState::UserOverridden
    );
}

#[test]
fn test_hidden_user_value_is_kept_but_inactive() {
    let mut host = host_from_source(FOO_BAR);
    set(&mut host, "FOO", "y");
    set(&mut host, "BAR", "y");
    set(&mut host, "FOO", "n");

    let analysis = host.analysis();
    let bar = analysis.model().get("BAR").unwrap();
    assert!(!bar.visible);
    assert!(!bar.active);
    assert_eq!(bar.value, Some(Value::Tristate(Tristate::No)));
    assert_eq!(bar.user, Some(Value::Tristate(Tristate::Yes)));

    // Re-enabling the dependency brings the kept value back.
    set(&mut host, "FOO", "y");
    assert_eq!(tristate(&host.analysis(), "BAR"), Some(Tristate::Yes));
}

#[test]
fn test_user_value_survives_reparse() {
    let mut host = host_from_source(FOO_BAR);
    set(&mut host, "FOO", "y");
    host.set_file_text(
        Path::new(ROOT),
        format!("{FOO_BAR}\nconfig EXTRA\n\tbool \"extra\"\n"),
    );
    let changes = host.reparse(&CancellationToken::new()).unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes.contains("EXTRA"));
    assert_eq!(tristate(&host.analysis(), "FOO"), Some(Tristate::Yes));
}

#[test]
fn test_choice_selection_is_exclusive() {
    let mut host = host_from_source(CHOICE_ABC);
    let analysis = host.analysis();
    assert_eq!(tristate(&analysis, "A"), Some(Tristate::Yes));
    assert_eq!(tristate(&analysis, "B"), Some(Tristate::No));

    let changes = host
        .set_value("B", "y", &CancellationToken::new())
        .unwrap();
    assert!(changes.contains("A"));
    assert!(changes.contains("B"));
    let analysis = host.analysis();
    assert_eq!(tristate(&analysis, "A"), Some(Tristate::No));
    assert_eq!(tristate(&analysis, "B"), Some(Tristate::Yes));
    assert_eq!(tristate(&analysis, "C"), Some(Tristate::No));

    set(&mut host, "C", "y");
    let analysis = host.analysis();
    let on: Vec<_> = ["A", "B", "C"]
        .into_iter()
        .filter(|n| tristate(&analysis, n) == Some(Tristate::Yes))
        .collect();
    assert_eq!(on, vec!["C"]);
}

#[test]
fn test_required_choice_cannot_be_emptied() {
    let mut host = host_from_source(CHOICE_ABC);
    let result = host.set_value("A", "n", &CancellationToken::new());
    assert!(matches!(
        result,
        Err(ChangeError::Invalid(ValidationError::ChoiceSelectionRequired(_)))
    ));
    let result = host.set_value("A", "m", &CancellationToken::new());
    assert!(matches!(
        result,
        Err(ChangeError::Invalid(ValidationError::ChoiceMemberValue(_)))
    ));
}

#[test]
fn test_select_raises_floor_without_lowering_user_value() {
    let text = "\
config TARGET
\ttristate \"target\"

config SEL
\tbool \"selector\"
\tselect TARGET
";
    let mut host = host_from_source(text);
    set(&mut host, "TARGET", "m");
    assert_eq!(tristate(&host.analysis(), "TARGET"), Some(Tristate::Module));

    set(&mut host, "SEL", "y");
    assert_eq!(tristate(&host.analysis(), "TARGET"), Some(Tristate::Yes));

    set(&mut host, "SEL", "n");
    set(&mut host, "TARGET", "y");
    set(&mut host, "SEL", "y");
    assert_eq!(tristate(&host.analysis(), "TARGET"), Some(Tristate::Yes));
}

#[test]
fn test_select_of_symbol_with_unmet_dependencies_warns() {
    let text = "\
config A
\tbool \"a\"
\tselect B

config B
\tbool
\tdepends on C

config C
\tbool \"c\"
";
    let mut host = host_from_source(text);
    set(&mut host, "A", "y");
    let analysis = host.analysis();
    assert_eq!(tristate(&analysis, "B"), Some(Tristate::Yes));
    let diagnostics = analysis.diagnostics(root_file(&analysis));
    assert_eq!(
        single(&diagnostics, codes::UNMET_DEPENDENCY).symbol.as_deref(),
        Some("B")
    );
}

#[test]
fn test_default_cycle_resolves_to_zero_with_one_diagnostic() {
    let host = host_from_source("config A\n\tbool\n\tdefault B\n\nconfig B\n\tbool\n\tdefault A\n");
    let analysis = host.analysis();
    assert_eq!(tristate(&analysis, "A"), Some(Tristate::No));
    assert_eq!(tristate(&analysis, "B"), Some(Tristate::No));
    let diagnostics = analysis.diagnostics(root_file(&analysis));
    single(&diagnostics, codes::CIRCULAR_DEPENDENCY);

    // Still exactly one after further evaluation passes.
    let mut host = host;
    host.reparse(&CancellationToken::new()).unwrap();
    let analysis = host.analysis();
    let diagnostics = analysis.diagnostics(root_file(&analysis));
    assert_eq!(with_code(&diagnostics, codes::CIRCULAR_DEPENDENCY).len(), 1);
}

#[test]
fn test_typed_values_and_ranges() {
    let mut host = host_from_source(BOARD);
    let analysis = host.analysis();
    assert_eq!(analysis.model().value("NR_CPUS"), Some(&Value::Int(4)));
    assert_eq!(
        analysis.model().value("HOSTNAME"),
        Some(&Value::String("board".into()))
    );
    assert_eq!(tristate(&analysis, "PRINTK"), Some(Tristate::No));

    set(&mut host, "NR_CPUS", "16");
    assert_eq!(host.analysis().model().value("NR_CPUS"), Some(&Value::Int(16)));

    let before = host.analysis();
    for bad in ["0", "65", "lots"] {
        assert!(host
            .set_value("NR_CPUS", bad, &CancellationToken::new())
            .is_err());
    }
    assert_eq!(host.analysis().model(), before.model());

    set(&mut host, "LOG", "y");
    assert_eq!(tristate(&host.analysis(), "PRINTK"), Some(Tristate::Yes));
}

#[test]
fn test_unknown_and_untyped_symbols_are_rejected() {
    let mut host = host_from_source("config A\n\tbool \"a\"\n\tdepends on IMPLICIT\n");
    let cancel = CancellationToken::new();
    assert!(matches!(
        host.set_value("NOPE", "y", &cancel),
        Err(ChangeError::Invalid(ValidationError::UnknownSymbol(_)))
    ));
    assert!(matches!(
        host.set_value("IMPLICIT", "y", &cancel),
        Err(ChangeError::Invalid(ValidationError::Untyped(_)))
    ));
}

#[test]
fn test_adding_option_modules_collapses_existing_tristates() {
    let plain = "config MODULES\n\tbool \"modules\"\n\nconfig T\n\ttristate \"t\"\n\tdefault m\n";
    let mut host = host_from_source(plain);
    assert_eq!(tristate(&host.analysis(), "T"), Some(Tristate::Module));

    let marked = plain.replace("\"modules\"\n", "\"modules\"\n\toption modules\n");
    host.set_file_text(Path::new(ROOT), marked);
    let changes = host.reparse(&CancellationToken::new()).unwrap();
    assert!(changes.contains("T"));
    assert_eq!(tristate(&host.analysis(), "T"), Some(Tristate::Yes));

    set(&mut host, "MODULES", "y");
    assert_eq!(tristate(&host.analysis(), "T"), Some(Tristate::Module));
}
