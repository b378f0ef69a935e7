//! Workspace snapshots and change notifications.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use kconfig::hir::{Tristate, Value};
use kconfig::project::{MemoryFileAccess, ProjectConfig};
use kconfig::server::Workspace;

use crate::helpers::host_helpers::ROOT;
use crate::helpers::source_fixtures::{CHOICE_ABC, FOO_BAR};

fn workspace(text: &str) -> Workspace {
    let access = MemoryFileAccess::new().with_file(ROOT, text);
    Workspace::new(ProjectConfig::default().with_root(ROOT), Arc::new(access))
}

fn tri(ws: &Workspace, name: &str) -> Option<Tristate> {
    ws.analysis().model().value(name).and_then(Value::as_tristate)
}

#[test]
fn test_root_is_loaded_on_creation() {
    let ws = workspace(FOO_BAR);
    assert!(ws.analysis().symbols().contains("FOO"));
}

#[test]
fn test_idempotent_set_notifies_once() {
    let ws = workspace(FOO_BAR);
    let changes = ws.subscribe();
    ws.set_value("FOO", "y").unwrap();
    ws.set_value("FOO", "y").unwrap();

    let received: Vec<_> = changes.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert!(received[0].symbols.iter().any(|s| s == "FOO"));
    assert!(received[0].symbols.iter().any(|s| s == "BAR"));
}

#[test]
fn test_choice_switch_is_one_notification() {
    let ws = workspace(CHOICE_ABC);
    let changes = ws.subscribe();
    ws.set_value("B", "y").unwrap();

    let received: Vec<_> = changes.try_iter().collect();
    assert_eq!(received.len(), 1);
    let mut symbols: Vec<&str> = received[0].symbols.iter().map(|s| s.as_str()).collect();
    symbols.sort_unstable();
    assert_eq!(symbols, vec!["A", "B"]);
}

#[test]
fn test_snapshots_are_isolated_from_later_writes() {
    let ws = workspace(FOO_BAR);
    let before = ws.analysis();
    ws.set_value("FOO", "y").unwrap();
    assert_eq!(
        before.model().value("FOO").and_then(Value::as_tristate),
        Some(Tristate::No)
    );
    assert_eq!(tri(&ws, "FOO"), Some(Tristate::Yes));
    assert!(ws.analysis().version() > before.version());
}

#[test]
fn test_choice_state_is_never_observed_half_applied() {
    let ws = Arc::new(workspace(CHOICE_ABC));
    let reader = {
        let ws = Arc::clone(&ws);
        thread::spawn(move || {
            for _ in 0..200 {
                let analysis = ws.analysis();
                let on = ["A", "B", "C"]
                    .iter()
                    .filter(|n| analysis.model().value(n) == Some(&Value::Tristate(Tristate::Yes)))
                    .count();
                assert_eq!(on, 1);
            }
        })
    };
    for name in ["B", "C", "A", "B", "C"] {
        ws.set_value(name, "y").unwrap();
    }
    reader.join().unwrap();
}

#[test]
fn test_edits_and_values_share_one_writer() {
    let ws = workspace(FOO_BAR);
    ws.set_value("FOO", "y").unwrap();
    ws.set_file_text(
        Path::new(ROOT),
        format!("{FOO_BAR}\nconfig BAZ\n\tbool \"baz\"\n\tdepends on BAR\n"),
    );
    assert!(ws.analysis().symbols().contains("BAZ"));
    ws.set_value("BAR", "y").unwrap();
    assert!(ws.analysis().model().get("BAZ").unwrap().visible);

    ws.close_file(Path::new(ROOT));
    assert!(!ws.analysis().symbols().contains("BAZ"));
    assert_eq!(tri(&ws, "FOO"), Some(Tristate::Yes));
}
