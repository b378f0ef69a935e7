//! Document outline tests.

use std::path::Path;

use kconfig::ide::{OutlineKind, SymbolInfo};

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::{BOARD, FOO_BAR};

fn find<'a>(symbols: &'a [SymbolInfo], name: &str) -> &'a SymbolInfo {
    symbols
        .iter()
        .find(|s| s.name.as_ref() == name)
        .unwrap_or_else(|| panic!("no outline entry {name}"))
}

#[test]
fn test_outline_mirrors_menu_tree() {
    let host = host_from_source(BOARD);
    let analysis = host.analysis();
    let outline = analysis.document_symbols(root_file(&analysis));

    let top: Vec<(&str, OutlineKind)> = outline
        .iter()
        .map(|s| (s.name.as_ref(), s.kind))
        .collect();
    assert_eq!(
        top,
        vec![
            ("Board", OutlineKind::MainMenu),
            ("Core", OutlineKind::Menu),
            ("LOG", OutlineKind::Config),
            ("PRINTK", OutlineKind::Config),
            ("Console", OutlineKind::Choice),
        ]
    );

    let core = find(&outline, "Core");
    let children: Vec<&str> = core.children.iter().map(|c| c.name.as_ref()).collect();
    assert_eq!(children, vec!["SMP", "NR_CPUS", "BASE_ADDR", "HOSTNAME"]);
    assert_eq!(
        find(&core.children, "NR_CPUS").detail.as_deref(),
        Some("int \"Maximum number of CPUs\"")
    );
    assert_eq!(find(&outline, "Console").children.len(), 2);
}

#[test]
fn test_outline_active_follows_visibility() {
    let mut host = host_from_source(FOO_BAR);
    let analysis = host.analysis();
    let outline = analysis.document_symbols(root_file(&analysis));
    assert!(find(&outline, "FOO").active);
    assert!(!find(&outline, "BAR").active);

    set(&mut host, "FOO", "y");
    let analysis = host.analysis();
    let outline = analysis.document_symbols(root_file(&analysis));
    assert!(find(&outline, "BAR").active);
}

#[test]
fn test_if_blocks_are_flattened() {
    let text = "config A\n\tbool \"a\"\n\nif A\nconfig B\n\tbool \"b\"\nendif\n";
    let host = host_from_source(text);
    let analysis = host.analysis();
    let outline = analysis.document_symbols(root_file(&analysis));
    let names: Vec<&str> = outline.iter().map(|s| s.name.as_ref()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_entries_from_other_files_are_omitted() {
    let host = host_from_files(&[
        (ROOT, "menu \"Top\"\nsource \"sub/Kconfig\"\nconfig LOCAL\n\tbool \"l\"\nendmenu\n"),
        ("/w/sub/Kconfig", "config REMOTE\n\tbool \"r\"\n"),
    ]);
    let analysis = host.analysis();

    let outline = analysis.document_symbols(root_file(&analysis));
    let top = find(&outline, "Top");
    let children: Vec<&str> = top.children.iter().map(|c| c.name.as_ref()).collect();
    assert_eq!(children, vec!["LOCAL"]);

    let sub = analysis.file_id(Path::new("/w/sub/Kconfig")).unwrap();
    let outline = analysis.document_symbols(sub);
    let names: Vec<&str> = outline.iter().map(|s| s.name.as_ref()).collect();
    assert_eq!(names, vec!["REMOTE"]);
}
