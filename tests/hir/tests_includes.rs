//! `source` resolution across files.

use std::sync::Arc;

use kconfig::hir::codes;
use kconfig::ide::AnalysisHost;
use kconfig::project::{MemoryFileAccess, ProjectConfig};
use tokio_util::sync::CancellationToken;

use crate::helpers::diagnostic_helpers::single;
use crate::helpers::host_helpers::*;

#[test]
fn test_source_variants_resolve() {
    let host = host_from_files(&[
        (
            ROOT,
            "source \"drivers/Kconfig\"\nosource \"missing/Kconfig\"\n",
        ),
        ("/w/drivers/Kconfig", "config DRV\n\tbool \"d\"\nrsource \"net/Kconfig\"\n"),
        ("/w/drivers/net/Kconfig", "config NET\n\tbool \"n\"\n"),
    ]);
    let analysis = host.analysis();
    assert!(analysis.symbols().contains("DRV"));
    assert!(analysis.symbols().contains("NET"));
    assert_eq!(analysis.project().files.len(), 3);
    assert!(
        analysis.project().diagnostics.is_empty(),
        "{:?}",
        analysis.project().diagnostics
    );
}

#[test]
fn test_missing_include_is_reported_at_directive() {
    let text = "config A\n\tbool\nsource \"gone/Kconfig\"\n";
    let host = host_from_source(text);
    let analysis = host.analysis();
    let file = root_file(&analysis);
    let diagnostics = analysis.diagnostics(file);
    let missing = single(&diagnostics, codes::MISSING_INCLUDE);
    assert_eq!(missing.file, file);
    assert_eq!(
        missing.span(analysis.line_index(file).unwrap()).start.line,
        2
    );
    // Parsing continues past the include.
    assert!(analysis.symbols().contains("A"));
}

#[test]
fn test_include_cycle_does_not_recurse() {
    let host = host_from_files(&[
        (ROOT, "source \"a/Kconfig\"\n"),
        ("/w/a/Kconfig", "config A\n\tbool\nsource \"../Kconfig\"\n"),
    ]);
    let analysis = host.analysis();
    single(&analysis.project().diagnostics, codes::INCLUDE_CYCLE);
    assert_eq!(analysis.project().files.len(), 2);
}

#[test]
fn test_source_path_variables_and_search_roots() {
    let access = MemoryFileAccess::new()
        .with_file(ROOT, "source \"arch/$(ARCH)/Kconfig\"\nsource \"Kconfig.ext\"\n")
        .with_file("/w/arch/riscv/Kconfig", "config RISCV\n\tdef_bool y\n")
        .with_file("/modules/Kconfig.ext", "config EXT\n\tbool \"ext\"\n");
    let config = ProjectConfig::default()
        .with_root(ROOT)
        .with_env("ARCH", "riscv")
        .with_search_root("/modules");
    let mut host = AnalysisHost::new(config, Arc::new(access));
    host.reparse(&CancellationToken::new()).unwrap();

    let analysis = host.analysis();
    assert!(analysis.symbols().contains("RISCV"));
    assert!(analysis.symbols().contains("EXT"));
    assert!(analysis.project().diagnostics.is_empty());
}

#[test]
fn test_undefined_variable_warns() {
    let host = host_from_source("osource \"$(UNSET)/Kconfig\"\n");
    single(&host.analysis().project().diagnostics, codes::UNDEFINED_VARIABLE);
}
