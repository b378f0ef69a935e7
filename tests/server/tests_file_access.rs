//! Workspaces read from the real filesystem.

use std::fs;
use std::sync::Arc;

use kconfig::hir::codes;
use kconfig::project::{FileAccess, OsFileAccess, ProjectConfig};
use kconfig::server::Workspace;
use tempfile::TempDir;

#[test]
fn test_os_file_access_reads_tree() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Kconfig");
    fs::create_dir_all(dir.path().join("drivers")).unwrap();
    fs::write(
        &root,
        "mainmenu \"Disk\"\nsource \"drivers/Kconfig\"\nsource \"absent/Kconfig\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("drivers/Kconfig"),
        "config DISK_DRIVER\n\tbool \"Disk driver\"\n\tdefault y\n",
    )
    .unwrap();

    assert!(OsFileAccess.exists(&root));
    assert!(!OsFileAccess.exists(&dir.path().join("drivers")));

    let workspace = Workspace::new(
        ProjectConfig::default().with_root(&root),
        Arc::new(OsFileAccess),
    );
    let analysis = workspace.analysis();
    assert!(analysis.symbols().contains("DISK_DRIVER"));
    assert_eq!(analysis.project().files.len(), 2);

    let file = analysis.file_id(&root).unwrap();
    let missing: Vec<_> = analysis
        .diagnostics(file)
        .into_iter()
        .filter(|d| d.code == codes::MISSING_INCLUDE)
        .collect();
    assert_eq!(missing.len(), 1);

    assert!(workspace.export_config().contains("# Disk\n"));
    assert!(workspace.export_config().contains("CONFIG_DISK_DRIVER=y\n"));
}

#[test]
fn test_project_config_loads_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kconfig.json");
    fs::write(
        &path,
        r#"{ "root": "/w/Kconfig", "searchRoots": ["/ext"], "env": { "ARCH": "arm" }, "configPrefix": "CFG_" }"#,
    )
    .unwrap();

    let config = ProjectConfig::load(&path).unwrap();
    assert_eq!(config.root.as_deref(), Some(std::path::Path::new("/w/Kconfig")));
    assert_eq!(config.search_roots.len(), 1);
    assert_eq!(config.env.get("ARCH").map(String::as_str), Some("arm"));
    assert_eq!(config.config_prefix, "CFG_");
    assert_eq!(config.max_cycle_iterations, kconfig::project::DEFAULT_MAX_CYCLE_ITERATIONS);

    assert!(ProjectConfig::load(dir.path().join("missing.json")).is_err());
}
