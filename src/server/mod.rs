//! Server layer: a concurrent workspace over one [`AnalysisHost`].
//!
//! - One writer: the host sits behind a mutex
//! - Many readers: the published [`Analysis`] is swapped atomically and
//!   readers query their own clone without holding any lock
//! - Text changes are queued per file; the newest one wins, and queuing a
//!   change cancels the pass working on an older one
//! - Subscribers receive a [`ConfigChange`] for every update that changed
//!   at least one symbol

pub mod protocol;
pub mod rpc;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ide::{Analysis, AnalysisHost, ChangeError, ImportOutcome};
use crate::model::{Cancelled, ChangeSet};
use crate::project::{FileAccess, ProjectConfig};

pub use rpc::{RpcError, RpcServer};

/// Path used for imports that do not name a file.
const DEFAULT_IMPORT_PATH: &str = ".config";

/// Symbols changed by one committed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub version: u64,
    pub symbols: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingChange {
    Text(String),
    Close,
}

pub struct Workspace {
    host: Mutex<AnalysisHost>,
    snapshot: RwLock<Analysis>,
    pending: Mutex<IndexMap<PathBuf, PendingChange>>,
    /// Token of the pass currently applying each file's change.
    in_flight: Mutex<FxHashMap<PathBuf, CancellationToken>>,
    subscribers: Mutex<Vec<Sender<ConfigChange>>>,
}

impl Workspace {
    /// Create a workspace; a configured root is loaded right away.
    pub fn new(config: ProjectConfig, access: Arc<dyn FileAccess>) -> Self {
        let has_root = config.root.is_some();
        let mut host = AnalysisHost::new(config, access);
        if has_root {
            // A fresh token is never cancelled.
            if host.reparse(&CancellationToken::new()).is_ok() {
                info!(
                    symbols = host.analysis().symbols().len(),
                    "loaded workspace root"
                );
            }
        }
        let snapshot = host.analysis();
        Self {
            host: Mutex::new(host),
            snapshot: RwLock::new(snapshot),
            pending: Mutex::new(IndexMap::new()),
            in_flight: Mutex::new(FxHashMap::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// The latest published snapshot.
    pub fn analysis(&self) -> Analysis {
        self.snapshot.read().clone()
    }

    /// Receive a [`ConfigChange`] for every effective update.
    pub fn subscribe(&self) -> Receiver<ConfigChange> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Queue new text for a file and apply pending changes if no other
    /// caller is already doing so.
    pub fn set_file_text(&self, path: &Path, text: String) {
        self.submit(path, PendingChange::Text(text));
    }

    pub fn close_file(&self, path: &Path) {
        self.submit(path, PendingChange::Close);
    }

    /// Validate and apply a user value. Pending text changes are applied
    /// first.
    pub fn set_value(&self, name: &str, raw: &str) -> Result<ChangeSet, ChangeError> {
        let mut host = self.host.lock();
        self.drain_locked(&mut host);
        let changes = host.set_value(name, raw, &CancellationToken::new())?;
        self.publish(&host, &changes);
        Ok(changes)
    }

    /// Import a `.config` file as one update.
    pub fn import_config(
        &self,
        path: Option<&Path>,
        text: &str,
    ) -> Result<ImportOutcome, Cancelled> {
        let mut host = self.host.lock();
        self.drain_locked(&mut host);
        let file = host.file_id(path.unwrap_or_else(|| Path::new(DEFAULT_IMPORT_PATH)));
        let outcome = host.import_config(file, text, &CancellationToken::new())?;
        self.publish(&host, &outcome.changes);
        Ok(outcome)
    }

    pub fn export_config(&self) -> String {
        self.analysis().export_config()
    }

    fn submit(&self, path: &Path, change: PendingChange) {
        self.pending.lock().insert(path.to_path_buf(), change);
        if let Some(token) = self.in_flight.lock().get(path) {
            token.cancel();
        }
        self.drain();
    }

    /// Apply queued changes until the queue stays empty. Returns at once if
    /// another caller holds the writer; that caller picks our change up.
    fn drain(&self) {
        loop {
            let Some(mut host) = self.host.try_lock() else {
                return;
            };
            self.drain_locked(&mut host);
            drop(host);
            if self.pending.lock().is_empty() {
                return;
            }
        }
    }

    fn drain_locked(&self, host: &mut AnalysisHost) {
        loop {
            let batch: Vec<(PathBuf, PendingChange)> = self.pending.lock().drain(..).collect();
            if batch.is_empty() {
                return;
            }

            let token = CancellationToken::new();
            {
                let mut in_flight = self.in_flight.lock();
                for (path, _) in &batch {
                    in_flight.insert(path.clone(), token.clone());
                }
            }
            for (path, change) in &batch {
                match change {
                    PendingChange::Text(text) => {
                        host.set_file_text(path, text.clone());
                    }
                    PendingChange::Close => {
                        host.close_file(path);
                    }
                }
            }

            let result = host.reparse(&token);
            {
                let mut in_flight = self.in_flight.lock();
                for (path, _) in &batch {
                    in_flight.remove(path);
                }
            }
            match result {
                Ok(changes) => self.publish(host, &changes),
                Err(Cancelled) => debug!(files = batch.len(), "reparse superseded by a newer edit"),
            }
        }
    }

    fn publish(&self, host: &AnalysisHost, changes: &ChangeSet) {
        *self.snapshot.write() = host.analysis();
        if changes.is_empty() {
            return;
        }
        let change = ConfigChange {
            version: host.version(),
            symbols: changes.symbols.clone(),
        };
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}
