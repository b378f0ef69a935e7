//! Per-file diagnostics.

use kconfig::hir::{Severity, codes};

use crate::helpers::diagnostic_helpers::with_code;
use crate::helpers::host_helpers::*;

#[test]
fn test_diagnostics_are_sorted_and_per_file() {
    let host = host_from_files(&[
        (
            ROOT,
            "config A\n\tbool \"a\"\n\t@@@\nsource \"sub/Kconfig\"\nendmenu\n",
        ),
        ("/w/sub/Kconfig", "config B\n\tbool\n\tdepends on GHOST\n"),
    ]);
    let analysis = host.analysis();
    let root = root_file(&analysis);
    let diagnostics = analysis.diagnostics(root);

    assert!(!with_code(&diagnostics, codes::SYNTAX_ERROR).is_empty());
    assert_eq!(with_code(&diagnostics, codes::UNBALANCED_BLOCK).len(), 1);
    assert!(with_code(&diagnostics, codes::IMPLICIT_DECLARATION).is_empty());
    assert!(diagnostics.iter().all(|d| d.file == root));
    assert!(
        diagnostics
            .windows(2)
            .all(|w| w[0].range.start() <= w[1].range.start())
    );

    let sub = analysis
        .file_id(std::path::Path::new("/w/sub/Kconfig"))
        .unwrap();
    let sub_diagnostics = analysis.diagnostics(sub);
    assert_eq!(sub_diagnostics.len(), 1);
    assert_eq!(sub_diagnostics[0].code, codes::IMPLICIT_DECLARATION);
    assert_eq!(sub_diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_clean_file_has_no_diagnostics() {
    let host = host_from_source("config A\n\tbool \"a\"\n\tdefault y\n");
    let analysis = host.analysis();
    assert!(analysis.diagnostics(root_file(&analysis)).is_empty());
}
