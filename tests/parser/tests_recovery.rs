//! Error recovery: a bad line never loses the rest of the file.

use kconfig::parser::{Entry, SyntaxErrorKind, parse};

fn config_names(input: &str) -> Vec<String> {
    parse(input)
        .source_file()
        .entries()
        .filter_map(|e| match e {
            Entry::Config(c) => c.name().map(|n| n.text()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_bad_attribute_line_keeps_following_entries() {
    let input = "config A\n\tbool \"a\"\n\t%%% nonsense\nconfig B\n\tbool \"b\"\n";
    let parse = parse(input);
    assert!(!parse.ok());
    assert_eq!(parse.syntax().to_string(), input);
    assert_eq!(config_names(input), vec!["A", "B"]);
}

#[test]
fn test_stray_closer_is_unbalanced() {
    let parse = parse("config A\n\tbool\nendmenu\n");
    let unbalanced: Vec<_> = parse
        .errors
        .iter()
        .filter(|e| e.kind == SyntaxErrorKind::Unbalanced)
        .collect();
    assert_eq!(unbalanced.len(), 1);
    assert!(unbalanced[0].message.contains("endmenu"));
}

#[test]
fn test_unclosed_choice_still_yields_members() {
    let input = "choice\n\tprompt \"p\"\nconfig A\n\tbool \"a\"\n";
    let parse = parse(input);
    assert!(
        parse
            .errors
            .iter()
            .any(|e| e.kind == SyntaxErrorKind::Unbalanced)
    );
    let Some(Entry::Choice(choice)) = parse.source_file().entries().next() else {
        panic!("expected choice");
    };
    assert_eq!(choice.entries().count(), 1);
}

#[test]
fn test_reparsing_identical_text_gives_identical_tree() {
    let input = "menu \"M\"\nconfig A\n\tbool \"a\" if B\n\tdefault y\n\t@ junk\nendmenu\n";
    let first = parse(input);
    let second = parse(input);
    assert_eq!(first.green, second.green);
    assert_eq!(first.errors, second.errors);
}
