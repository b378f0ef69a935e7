//! `.config` export and import.

use std::path::Path;

use kconfig::hir::{Tristate, Value, codes};
use kconfig::ide::AnalysisHost;

use crate::helpers::diagnostic_helpers::{single, with_code};
use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::BOARD;
use tokio_util::sync::CancellationToken;

/// `(name, type, value, visible)` for every typed symbol.
fn visible_config(host: &AnalysisHost) -> Vec<(String, Option<&'static str>, Option<Value>, bool)> {
    host.analysis()
        .model()
        .iter()
        .filter(|e| e.ty.is_some())
        .map(|e| {
            (
                e.name.to_string(),
                e.ty.map(|t| t.as_str()),
                e.value.clone(),
                e.visible,
            )
        })
        .collect()
}

#[test]
fn test_export_format() {
    let mut host = host_from_source(BOARD);
    set(&mut host, "HOSTNAME", "my \"box\"");
    let text = host.analysis().export_config();

    assert!(text.starts_with("#\n# Automatically generated file; DO NOT EDIT.\n"));
    let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        lines,
        vec![
            "CONFIG_SMP=y",
            "CONFIG_NR_CPUS=4",
            "CONFIG_BASE_ADDR=0x8000",
            r#"CONFIG_HOSTNAME="my \"box\"""#,
            "CONFIG_LOG=n",
            "CONFIG_PRINTK=n",
            "CONFIG_CONSOLE_UART=y",
            "CONFIG_CONSOLE_USB=n",
        ]
    );
}

#[test]
fn test_inactive_symbols_are_omitted() {
    let mut host = host_from_source(BOARD);
    set(&mut host, "SMP", "n");
    let text = host.analysis().export_config();
    assert!(!text.contains("NR_CPUS"));
    assert!(text.contains("CONFIG_SMP=n"));
}

#[test]
fn test_export_import_round_trip() {
    let mut source = host_from_source(BOARD);
    set(&mut source, "SMP", "y");
    set(&mut source, "NR_CPUS", "12");
    set(&mut source, "BASE_ADDR", "0xdead0000");
    set(&mut source, "HOSTNAME", "edge\\node");
    set(&mut source, "LOG", "y");
    set(&mut source, "CONSOLE_USB", "y");
    let exported = source.analysis().export_config();

    let mut target = host_from_source(BOARD);
    let file = target.file_id(Path::new("/w/.config"));
    let outcome = target
        .import_config(file, &exported, &CancellationToken::new())
        .unwrap();
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert_eq!(visible_config(&target), visible_config(&source));
}

#[test]
fn test_import_skips_unknown_and_bad_lines() {
    let mut host = host_from_source(BOARD);
    let file = host.file_id(Path::new("/w/.config"));
    let text = "\
# CONFIG_SMP is not set
CONFIG_GONE=y
CONFIG_NR_CPUS=999
this is not an assignment
LOG=y
";
    let outcome = host
        .import_config(file, text, &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.applied, 2);
    assert_eq!(
        single(&outcome.diagnostics, codes::UNKNOWN_SYMBOL).symbol.as_deref(),
        Some("GONE")
    );
    assert_eq!(with_code(&outcome.diagnostics, codes::INVALID_CONFIG_LINE).len(), 2);

    let analysis = host.analysis();
    assert_eq!(tristate(&analysis, "SMP"), Some(Tristate::No));
    assert_eq!(tristate(&analysis, "LOG"), Some(Tristate::Yes));
    // The import is one update.
    assert!(outcome.changes.contains("SMP"));
    assert!(outcome.changes.contains("PRINTK"));
    // Import diagnostics are reported against the imported file.
    assert_eq!(analysis.diagnostics(file).len(), 3);
}
