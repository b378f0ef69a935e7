//! AnalysisHost and Analysis: the change coordinator and its snapshots.
//!
//! The `AnalysisHost` owns all mutable state: file inputs, open buffers,
//! user values and the current evaluated model. Every change goes through
//! it. Queries run on an [`Analysis`], an immutable snapshot that is cheap
//! to clone and never observes a partially evaluated model.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new(config, Arc::new(OsFileAccess));
//!
//! // Apply file changes
//! let file = host.set_file_text(Path::new("Kconfig"), text);
//! host.reparse(&CancellationToken::new())?;
//!
//! // Get a snapshot for queries
//! let analysis = host.analysis();
//! let symbols = analysis.document_symbols(file);
//! ```

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use salsa::Setter;
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::base::{FileId, FileRange, LineIndex, Position, TextRange};
use crate::hir::{
    Diagnostic, FileText, LoweredProject, MenuTree, ParseResult, RootDatabase, SourceDb,
    SymbolTable, SymbolType, codes, lower, parse_file,
};
use crate::model::{
    Cancelled, ChangeSet, ConfigModel, DependencyGraph, Engine, Seeds, UserEdit, UserValues,
    ValidationError, export_config, parse_config, validate_value,
};
use crate::parser::SourceKind;
use crate::project::{ExpandedPath, FileAccess, FileSet, IncludeResolver, ProjectConfig};

use super::{CompletionItem, HoverResult, SymbolInfo};

/// Why a value change was not applied. The host is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Result of importing a `.config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Lines that produced a user value.
    pub applied: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub changes: ChangeSet,
}

/// Owns all mutable state for the IDE layer.
///
/// Record edits with `set_file_text()` and `close_file()`, apply them with
/// `reparse()`, then get a consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    db: RootDatabase,
    config: ProjectConfig,
    resolver: IncludeResolver,
    access: Arc<dyn FileAccess>,
    files: FileSet,
    inputs: FxHashMap<FileId, FileText>,
    /// Open editor buffers, in the order they were opened.
    open: IndexMap<FileId, String, FxBuildHasher>,
    user: UserValues,
    project: Arc<LoweredProject>,
    graph: Arc<DependencyGraph>,
    model: Arc<ConfigModel>,
    fingerprints: IndexMap<SmolStr, u64, FxBuildHasher>,
    /// `W0003` from the last reparse.
    dropped: Vec<Diagnostic>,
    /// Diagnostics of the last import.
    imported: Vec<Diagnostic>,
    version: u64,
}

impl AnalysisHost {
    pub fn new(config: ProjectConfig, access: Arc<dyn FileAccess>) -> Self {
        let project = LoweredProject {
            symbols: SymbolTable::new(),
            menu: MenuTree::new(FileId::new(0)),
            diagnostics: Vec::new(),
            files: IndexMap::default(),
        };
        let graph = DependencyGraph::build(&project.symbols, &project.menu);
        Self {
            db: RootDatabase::new(),
            resolver: IncludeResolver::new(&config),
            config,
            access,
            files: FileSet::new(),
            inputs: FxHashMap::default(),
            open: IndexMap::default(),
            user: UserValues::default(),
            project: Arc::new(project),
            graph: Arc::new(graph),
            model: Arc::new(ConfigModel::new()),
            fingerprints: IndexMap::default(),
            dropped: Vec::new(),
            imported: Vec::new(),
            version: 0,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Bumped by every change that alters at least one symbol.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Id for a path, allocating one on first use.
    pub fn file_id(&mut self, path: &Path) -> FileId {
        self.files.intern(path)
    }

    /// Replace the buffer of an open file. Takes effect on the next reparse.
    pub fn set_file_text(&mut self, path: &Path, text: String) -> FileId {
        let file = self.files.intern(path);
        self.open.insert(file, text);
        file
    }

    /// Forget an open buffer; the file is read from disk again if reachable.
    pub fn close_file(&mut self, path: &Path) -> Option<FileId> {
        let file = self.files.file_id(path)?;
        self.open.shift_remove(&file).map(|_| file)
    }

    pub fn is_open(&self, file: FileId) -> bool {
        self.open.contains_key(&file)
    }

    /// Lower every root again and re-evaluate what changed.
    ///
    /// User values are remapped onto the new symbols by name; values whose
    /// symbol disappeared or changed type are dropped with `W0003`.
    pub fn reparse(&mut self, cancel: &CancellationToken) -> Result<ChangeSet, Cancelled> {
        let roots = self.roots();
        let project = lower(self, &roots);
        if cancel.is_cancelled() {
            debug!("reparse cancelled after lowering");
            return Err(Cancelled);
        }
        let graph = DependencyGraph::build(&project.symbols, &project.menu);
        let fingerprints = project.symbols.fingerprints();

        let mut seeds: Vec<SmolStr> = fingerprints
            .iter()
            .filter(|(name, fp)| self.fingerprints.get(*name) != Some(*fp))
            .map(|(name, _)| name.clone())
            .collect();
        seeds.extend(
            self.fingerprints
                .keys()
                .filter(|name| !fingerprints.contains_key(*name))
                .cloned(),
        );
        if project.symbols.modules_symbol() != self.project.symbols.modules_symbol() {
            for symbol in project.symbols.iter() {
                if symbol.ty == Some(SymbolType::Tristate) && !seeds.contains(&symbol.name) {
                    seeds.push(symbol.name.clone());
                }
            }
        }

        let mut user = UserValues::default();
        let mut dropped = Vec::new();
        for (name, value) in &self.user {
            let message = match project.symbols.get(name).and_then(|s| s.ty) {
                Some(ty) if value.fits(ty) => {
                    user.insert(name.clone(), value.clone());
                    continue;
                }
                Some(ty) => {
                    format!("user value {value} of `{name}` is not a valid {ty} and was dropped")
                }
                None => {
                    format!("`{name}` is no longer declared; its user value {value} was dropped")
                }
            };
            warn!(symbol = %name, "dropping user value on reparse");
            let location = project
                .symbols
                .get(name)
                .and_then(|s| s.first_location())
                .or_else(|| self.project.symbols.get(name).and_then(|s| s.first_location()))
                .unwrap_or_else(|| {
                    let file = roots.first().copied().unwrap_or(FileId::new(0));
                    FileRange::new(file, TextRange::default())
                });
            dropped.push(
                Diagnostic::warning(location, codes::USER_VALUE_DROPPED, message)
                    .with_symbol(name.clone()),
            );
            if !seeds.contains(name) {
                seeds.push(name.clone());
            }
        }

        let engine = Engine::new(
            &project.symbols,
            &project.menu,
            &graph,
            self.config.max_cycle_iterations,
        );
        let (model, changes) =
            engine.update(&self.model, &user, &Seeds::Names(seeds), true, cancel)?;

        debug!(
            files = project.files.len(),
            symbols = project.symbols.len(),
            changed = changes.len(),
            "reparse committed"
        );
        self.project = Arc::new(project);
        self.graph = Arc::new(graph);
        self.model = Arc::new(model);
        self.fingerprints = fingerprints;
        self.user = user;
        self.dropped = dropped;
        if !changes.is_empty() {
            self.version += 1;
        }
        Ok(changes)
    }

    /// Validate and apply one user value.
    ///
    /// Setting the same value twice changes nothing the second time.
    pub fn set_value(
        &mut self,
        name: &str,
        raw: &str,
        cancel: &CancellationToken,
    ) -> Result<ChangeSet, ChangeError> {
        let edits = validate_value(&self.project.symbols, &self.model, name, raw)?;
        let mut user = self.user.clone();
        apply_edits(&mut user, &edits);
        if user == self.user {
            return Ok(ChangeSet::default());
        }
        let seeds = edits.into_iter().map(|e| e.name).collect();
        Ok(self.commit_user(user, seeds, cancel)?)
    }

    /// Apply a `.config` file as one update.
    pub fn import_config(
        &mut self,
        file: FileId,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, Cancelled> {
        let parsed = parse_config(file, text, &self.config.config_prefix);
        let mut diagnostics = parsed.diagnostics;
        let mut user = self.user.clone();
        let mut seeds = Vec::new();
        let mut applied = 0;

        for line in &parsed.lines {
            let at = FileRange::new(file, line.range);
            let Some(symbol) = self.project.symbols.get(&line.name) else {
                diagnostics.push(
                    Diagnostic::warning(
                        at,
                        codes::UNKNOWN_SYMBOL,
                        format!("unknown symbol `{}`", line.name),
                    )
                    .with_symbol(line.name.clone()),
                );
                continue;
            };
            // The selected member already says everything.
            if symbol.choice.is_some() && line.value.trim() == "n" {
                continue;
            }
            match validate_value(&self.project.symbols, &self.model, &line.name, &line.value) {
                Ok(edits) => {
                    seeds.extend(edits.iter().map(|e| e.name.clone()));
                    apply_edits(&mut user, &edits);
                    applied += 1;
                }
                Err(error) => diagnostics.push(
                    Diagnostic::warning(at, codes::INVALID_CONFIG_LINE, error.to_string())
                        .with_symbol(line.name.clone()),
                ),
            }
        }

        let changes = self.commit_user(user, seeds, cancel)?;
        info!(applied, issues = diagnostics.len(), "imported configuration");
        self.imported = diagnostics.clone();
        Ok(ImportOutcome {
            applied,
            diagnostics,
            changes,
        })
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis {
        let mut transient = self.dropped.clone();
        transient.extend(self.imported.iter().cloned());
        Analysis {
            project: Arc::clone(&self.project),
            graph: Arc::clone(&self.graph),
            model: Arc::clone(&self.model),
            user: Arc::new(self.user.clone()),
            files: Arc::new(self.files.clone()),
            transient: transient.into(),
            config_prefix: SmolStr::new(&self.config.config_prefix),
            version: self.version,
        }
    }

    fn commit_user(
        &mut self,
        user: UserValues,
        seeds: Vec<SmolStr>,
        cancel: &CancellationToken,
    ) -> Result<ChangeSet, Cancelled> {
        let engine = Engine::new(
            &self.project.symbols,
            &self.project.menu,
            &self.graph,
            self.config.max_cycle_iterations,
        );
        let (model, changes) =
            engine.update(&self.model, &user, &Seeds::Names(seeds), false, cancel)?;
        self.model = Arc::new(model);
        self.user = user;
        if !changes.is_empty() {
            self.version += 1;
        }
        Ok(changes)
    }

    /// The configured root, then every open buffer not reached from it.
    fn roots(&mut self) -> Vec<FileId> {
        let mut roots = Vec::with_capacity(self.open.len() + 1);
        if let Some(root) = &self.config.root {
            roots.push(self.files.intern(root));
        }
        for &file in self.open.keys() {
            if !roots.contains(&file) {
                roots.push(file);
            }
        }
        roots
    }

    fn read(&self, file: FileId) -> Option<String> {
        if let Some(text) = self.open.get(&file) {
            return Some(text.clone());
        }
        let path = self.files.path(file)?;
        match self.access.read_to_string(path) {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(path = %path.display(), %error, "cannot read Kconfig file");
                None
            }
        }
    }
}

impl SourceDb for AnalysisHost {
    fn parsed(&mut self, file: FileId) -> Option<ParseResult> {
        let text = self.read(file)?;
        let input = match self.inputs.get(&file).copied() {
            Some(input) => {
                if input.text(&self.db) != &text {
                    input.set_text(&mut self.db).to(text);
                }
                input
            }
            None => {
                let input = FileText::new(&self.db, file, text);
                self.inputs.insert(file, input);
                input
            }
        };
        Some(parse_file(&self.db, input))
    }

    fn expand(&self, raw: &str) -> ExpandedPath {
        self.resolver.expand(raw)
    }

    fn resolve_source(&mut self, from: FileId, path: &str, kind: SourceKind) -> Option<FileId> {
        let including = self.files.path(from)?.to_path_buf();
        for candidate in self.resolver.candidates(&including, path, kind.relative) {
            let open = self
                .files
                .file_id(&candidate)
                .is_some_and(|id| self.open.contains_key(&id));
            if open || self.access.exists(&candidate) {
                return Some(self.files.intern(&candidate));
            }
        }
        None
    }

    fn display_path(&self, file: FileId) -> String {
        self.files
            .path(file)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("<file {}>", file.index()))
    }
}

fn apply_edits(user: &mut UserValues, edits: &[UserEdit]) {
    for edit in edits {
        match &edit.value {
            Some(value) => {
                user.insert(edit.name.clone(), value.clone());
            }
            None => {
                user.shift_remove(&edit.name);
            }
        }
    }
}

/// An immutable snapshot of the analysis state.
///
/// All IDE queries go through this struct to ensure consistent results.
#[derive(Clone)]
pub struct Analysis {
    project: Arc<LoweredProject>,
    graph: Arc<DependencyGraph>,
    model: Arc<ConfigModel>,
    user: Arc<UserValues>,
    files: Arc<FileSet>,
    transient: Arc<[Diagnostic]>,
    config_prefix: SmolStr,
    version: u64,
}

impl Analysis {
    // ==================== Queries ====================

    /// Get hover information at a position.
    pub fn hover(&self, file: FileId, position: Position) -> Option<HoverResult> {
        super::hover(self, file, position)
    }

    /// Get completions at a position.
    pub fn completions(&self, file: FileId, position: Position) -> Vec<CompletionItem> {
        super::completions(self, file, position)
    }

    /// Get the outline of a document.
    pub fn document_symbols(&self, file: FileId) -> Vec<SymbolInfo> {
        super::document_symbols(self, file)
    }

    /// Get all diagnostics of a file, sorted by position.
    pub fn diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        super::file_diagnostics(self, file)
    }

    /// Render the evaluated configuration as a `.config` file.
    pub fn export_config(&self) -> String {
        export_config(&self.model, &self.config_prefix, self.project.menu.title())
    }

    // ==================== Accessors ====================

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn project(&self) -> &LoweredProject {
        &self.project
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.project.symbols
    }

    pub fn menu(&self) -> &MenuTree {
        &self.project.menu
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn model(&self) -> &ConfigModel {
        &self.model
    }

    pub fn user_values(&self) -> &UserValues {
        &self.user
    }

    /// Dropped user values and the diagnostics of the last import.
    pub fn transient_diagnostics(&self) -> &[Diagnostic] {
        &self.transient
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.files.file_id(path)
    }

    pub fn file_path(&self, file: FileId) -> Option<&Path> {
        self.files.path(file)
    }

    /// Line index of a file reached by the last reparse.
    pub fn line_index(&self, file: FileId) -> Option<&LineIndex> {
        self.project.files.get(&file).map(|p| &*p.line_index)
    }

    pub fn parse(&self, file: FileId) -> Option<&ParseResult> {
        self.project.files.get(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{Tristate, Value};
    use crate::project::MemoryFileAccess;

    fn host_with(files: &[(&str, &str)]) -> AnalysisHost {
        let mut access = MemoryFileAccess::new();
        for (path, text) in files {
            access = access.with_file(path, *text);
        }
        let config = ProjectConfig::default().with_root("/w/Kconfig");
        let mut host = AnalysisHost::new(config, Arc::new(access));
        host.reparse(&CancellationToken::new()).unwrap();
        host
    }

    #[test]
    fn test_root_and_includes_are_read_through_file_access() {
        let host = host_with(&[
            ("/w/Kconfig", "source \"sub/Kconfig\"\nconfig A\n\tbool \"a\"\n"),
            ("/w/sub/Kconfig", "config B\n\tbool \"b\"\n\tdefault y\n"),
        ]);
        let analysis = host.analysis();
        assert!(analysis.symbols().contains("A"));
        assert_eq!(
            analysis.model().value("B"),
            Some(&Value::Tristate(Tristate::Yes))
        );
        assert_eq!(analysis.project().files.len(), 2);
    }

    #[test]
    fn test_open_buffer_overrides_disk() {
        let mut host = host_with(&[("/w/Kconfig", "config A\n\tbool \"a\"\n")]);
        let cancel = CancellationToken::new();
        host.set_file_text(Path::new("/w/Kconfig"), "config Z\n\tbool \"z\"\n".into());
        let changes = host.reparse(&cancel).unwrap();
        assert!(changes.contains("A"));
        assert!(changes.contains("Z"));
        assert!(!host.analysis().symbols().contains("A"));

        host.close_file(Path::new("/w/Kconfig"));
        host.reparse(&cancel).unwrap();
        assert!(host.analysis().symbols().contains("A"));
    }

    #[test]
    fn test_user_value_of_removed_symbol_is_dropped() {
        let mut host = host_with(&[("/w/Kconfig", "config A\n\tbool \"a\"\n")]);
        let cancel = CancellationToken::new();
        host.set_value("A", "y", &cancel).unwrap();
        host.set_file_text(Path::new("/w/Kconfig"), "config B\n\tbool \"b\"\n".into());
        host.reparse(&cancel).unwrap();

        let analysis = host.analysis();
        assert!(analysis.user_values().is_empty());
        let dropped: Vec<_> = analysis
            .transient_diagnostics()
            .iter()
            .filter(|d| d.code == codes::USER_VALUE_DROPPED)
            .collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].symbol.as_deref(), Some("A"));
    }

    #[test]
    fn test_version_tracks_effective_changes() {
        let mut host = host_with(&[("/w/Kconfig", "config A\n\tbool \"a\"\n")]);
        let cancel = CancellationToken::new();
        let before = host.version();
        assert_eq!(host.set_value("A", "y", &cancel).unwrap().len(), 1);
        assert!(host.set_value("A", "y", &cancel).unwrap().is_empty());
        assert_eq!(host.version(), before + 1);
        assert!(host.reparse(&cancel).unwrap().is_empty());
        assert_eq!(host.version(), before + 1);
    }

    #[test]
    fn test_cancelled_reparse_keeps_snapshot() {
        let mut host = host_with(&[("/w/Kconfig", "config A\n\tbool \"a\"\n")]);
        host.set_file_text(Path::new("/w/Kconfig"), "config B\n\tbool\n".into());
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(host.reparse(&cancel), Err(Cancelled));
        assert!(host.analysis().symbols().contains("A"));
    }

    #[test]
    fn test_rejected_value_leaves_model_unchanged() {
        let mut host = host_with(&[("/w/Kconfig", "config N\n\tint \"n\"\n\trange 1 4\n")]);
        let before = host.analysis();
        let result = host.set_value("N", "9", &CancellationToken::new());
        assert!(matches!(
            result,
            Err(ChangeError::Invalid(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(host.analysis().model(), before.model());
    }
}
