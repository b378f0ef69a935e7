//! Code completion tests for the IDE layer.
//!
//! Fixtures contain the half-typed line the cursor sits on, exactly as an
//! editor buffer would while the user types.

use kconfig::base::Position;
use kconfig::ide::CompletionKind;

use crate::helpers::host_helpers::*;

fn labels_at(files: &[(&str, &str)], position: Position) -> Vec<String> {
    let host = host_from_files(files);
    let analysis = host.analysis();
    analysis
        .completions(root_file(&analysis), position)
        .iter()
        .map(|i| i.label.to_string())
        .collect()
}

#[test]
fn test_expression_prefix_is_case_insensitive() {
    let text = "config FOO\n\tbool \"Foo\"\n\nconfig FIZZ\n\tint\n\nconfig BAR\n\tbool \"Bar\"\n\tdepends on f\n";
    let labels = labels_at(&[(ROOT, text)], Position::new(8, 13));
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"FOO".to_string()));
    assert!(labels.contains(&"FIZZ".to_string()));
}

#[test]
fn test_expression_ranks_by_distance_then_other_files_then_constants() {
    let text = "\
source \"sub/Kconfig\"

config FAR
\tbool \"far\"

config NEAR
\tbool \"near\"

config CUR
\tbool \"cur\"
\tdepends on 
";
    let labels = labels_at(
        &[(ROOT, text), ("/w/sub/Kconfig", "config ZED\n\tbool \"zed\"\n")],
        Position::new(10, 12),
    );
    assert_eq!(labels, vec!["CUR", "NEAR", "FAR", "ZED", "m", "n", "y"]);
}

#[test]
fn test_select_offers_only_boolean_symbols() {
    let text = "config COUNT\n\tint \"count\"\n\nconfig FLAG\n\ttristate \"flag\"\n\nconfig A\n\tbool \"a\"\n\tselect \n";
    let labels = labels_at(&[(ROOT, text)], Position::new(8, 8));
    assert!(labels.contains(&"FLAG".to_string()));
    assert!(labels.contains(&"A".to_string()));
    assert!(!labels.contains(&"COUNT".to_string()));
    assert!(!labels.contains(&"y".to_string()));
}

#[test]
fn test_new_config_offers_undeclared_names() {
    let text = "config A\n\tbool \"a\"\n\tdepends on MISSING\n\nconfig \n";
    let labels = labels_at(&[(ROOT, text)], Position::new(4, 7));
    assert_eq!(labels, vec!["MISSING"]);
}

#[test]
fn test_indented_statement_prefers_attributes() {
    let text = "config A\n\tbool \"a\"\n\t\n";
    let host = host_from_source(text);
    let analysis = host.analysis();
    let items = analysis.completions(root_file(&analysis), Position::new(2, 1));
    assert!(items.iter().all(|i| i.kind == CompletionKind::Keyword));
    assert_eq!(items[0].label.as_ref(), "bool");
    assert!(items.iter().any(|i| i.label.as_ref() == "config"));

    let items = analysis.completions(root_file(&analysis), Position::new(3, 0));
    assert_eq!(items[0].label.as_ref(), "config");
}

#[test]
fn test_no_completions_inside_strings_and_comments() {
    let text = "config A\n\tbool \"A n\n# depends on A\n";
    assert!(labels_at(&[(ROOT, text)], Position::new(1, 9)).is_empty());
    assert!(labels_at(&[(ROOT, text)], Position::new(2, 14)).is_empty());
}

#[test]
fn test_symbol_item_carries_type_and_prompt() {
    let text = "config SMP\n\tbool \"Multiprocessing\"\n\thelp\n\t  Many cores.\n\nconfig B\n\tbool\n\tdepends on SM\n";
    let host = host_from_source(text);
    let analysis = host.analysis();
    let items = analysis.completions(root_file(&analysis), Position::new(7, 14));
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.kind, CompletionKind::Symbol);
    assert_eq!(item.detail.as_deref(), Some("bool \"Multiprocessing\""));
    assert_eq!(item.documentation.as_deref(), Some("Many cores."));
    assert_eq!(item.sort_priority, 0);
}
