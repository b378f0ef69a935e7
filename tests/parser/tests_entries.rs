//! Entry-level parsing through the typed AST.

use kconfig::parser::{Attribute, Entry, parse};
use rstest::rstest;

use crate::helpers::source_fixtures::BOARD;

fn entry_kind(entry: &Entry) -> &'static str {
    match entry {
        Entry::Config(c) if c.is_menuconfig() => "menuconfig",
        Entry::Config(_) => "config",
        Entry::Choice(_) => "choice",
        Entry::Comment(_) => "comment",
        Entry::Menu(_) => "menu",
        Entry::If(_) => "if",
        Entry::Source(_) => "source",
        Entry::MainMenu(_) => "mainmenu",
    }
}

#[rstest]
#[case("config A\n\tbool\n", "config")]
#[case("menuconfig A\n\tbool \"a\"\n", "menuconfig")]
#[case("choice\n\tprompt \"p\"\nendchoice\n", "choice")]
#[case("comment \"hello\"\n", "comment")]
#[case("menu \"M\"\nendmenu\n", "menu")]
#[case("if A\nendif\n", "if")]
#[case("source \"x/Kconfig\"\n", "source")]
#[case("rsource \"x/Kconfig\"\n", "source")]
#[case("mainmenu \"Title\"\n", "mainmenu")]
fn test_top_level_entry(#[case] input: &str, #[case] expected: &str) {
    let parse = parse(input);
    assert!(parse.ok(), "{input:?}: {:?}", parse.errors);
    let entries: Vec<_> = parse.source_file().entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entry_kind(&entries[0]), expected);
}

#[test]
fn test_board_fixture_parses_cleanly_and_losslessly() {
    let parse = parse(BOARD);
    assert!(parse.ok(), "{:?}", parse.errors);
    assert_eq!(parse.syntax().to_string(), BOARD);

    let kinds: Vec<_> = parse
        .source_file()
        .entries()
        .map(|e| entry_kind(&e))
        .collect();
    assert_eq!(kinds, vec!["mainmenu", "menu", "config", "config", "choice"]);
}

#[test]
fn test_menu_children_and_attributes() {
    let parse = parse(BOARD);
    let menu = parse
        .source_file()
        .entries()
        .find_map(|e| match e {
            Entry::Menu(m) => Some(m),
            _ => None,
        })
        .expect("menu");
    assert_eq!(menu.title().as_deref(), Some("Core"));

    let names: Vec<String> = menu
        .entries()
        .filter_map(|e| match e {
            Entry::Config(c) => c.name().map(|n| n.text()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["SMP", "NR_CPUS", "BASE_ADDR", "HOSTNAME"]);

    let Some(Entry::Config(nr_cpus)) = menu.entries().nth(1) else {
        panic!("expected NR_CPUS");
    };
    let attributes: Vec<_> = nr_cpus.attributes().collect();
    assert!(matches!(attributes[0], Attribute::Type(_)));
    assert!(matches!(attributes[1], Attribute::Range(_)));
    assert!(matches!(attributes[2], Attribute::Depends(_)));
    assert!(matches!(attributes[3], Attribute::Default(_)));
}

#[test]
fn test_select_and_imply_targets() {
    let parse = parse("config A\n\tbool\n\tselect B if C\n\timply D\n");
    let Some(Entry::Config(config)) = parse.source_file().entries().next() else {
        panic!("expected config");
    };
    let targets: Vec<(bool, String)> = config
        .attributes()
        .filter_map(|a| match a {
            Attribute::Select(s) | Attribute::Imply(s) => {
                let target = s.target()?.name();
                Some((s.is_imply(), target))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        targets,
        vec![(false, "B".to_string()), (true, "D".to_string())]
    );
}

#[test]
fn test_line_continuation_joins_expression() {
    let input = "config A\n\tbool\n\tdepends on B && \\\n\t\tC\n";
    let parse = parse(input);
    assert!(parse.ok(), "{:?}", parse.errors);
    assert_eq!(parse.syntax().to_string(), input);
}
