//! Hover tests.

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::{BOARD, FOO_BAR};

#[test]
fn test_hover_on_dependency_reference() {
    let host = host_from_source(FOO_BAR);
    let analysis = host.analysis();
    let position = position_of(FOO_BAR, "on FOO", 4);
    let hover = analysis
        .hover(root_file(&analysis), position)
        .expect("hover on FOO");
    assert_eq!(hover.symbol, "FOO");
    assert!(hover.contents.starts_with("**FOO** `bool`"), "{}", hover.contents);
    assert!(hover.contents.contains("\"Foo\""));
    assert!(hover.contents.contains("Value: `n` (default), visible"));
    assert!(hover.contents.contains("Defined at: `/w/Kconfig:1`"));
    assert_eq!(hover.span.start, position);
}

#[test]
fn test_hover_shows_dependency_and_state() {
    let mut host = host_from_source(FOO_BAR);
    let position = position_of(FOO_BAR, "BAR", 0);

    let analysis = host.analysis();
    let hover = analysis.hover(root_file(&analysis), position).unwrap();
    assert!(hover.contents.contains("Depends on: `FOO`"));
    assert!(hover.contents.contains("inactive"));
    assert!(hover.contents.contains("Defined at: `/w/Kconfig:4`"));

    set(&mut host, "FOO", "y");
    set(&mut host, "BAR", "y");
    let analysis = host.analysis();
    let hover = analysis.hover(root_file(&analysis), position).unwrap();
    assert!(hover.contents.contains("Value: `y` (user), visible"), "{}", hover.contents);
}

#[test]
fn test_hover_lists_selectors_and_help() {
    let host = host_from_source(BOARD);
    let analysis = host.analysis();
    let file = root_file(&analysis);

    let hover = analysis
        .hover(file, position_of(BOARD, "config PRINTK", 7))
        .unwrap();
    assert!(hover.contents.contains("Selected by: `LOG` (select)"), "{}", hover.contents);

    let hover = analysis
        .hover(file, position_of(BOARD, "config SMP", 8))
        .unwrap();
    let (_, help) = hover.contents.split_once("\n---\n").expect("help rule");
    assert!(help.contains("Run on more than one core."));
}

#[test]
fn test_no_hover_off_symbols() {
    let host = host_from_source(FOO_BAR);
    let analysis = host.analysis();
    let file = root_file(&analysis);
    assert!(analysis.hover(file, position_of(FOO_BAR, "bool", 1)).is_none());
    assert!(analysis.hover(file, position_of(FOO_BAR, "\"Foo\"", 2)).is_none());
}
