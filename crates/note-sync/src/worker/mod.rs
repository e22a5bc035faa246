//! Local sync worker
//!
//! Owns the queue of roots with known local changes and drives round trips
//! with the remote: snapshot, transport, apply, persist. Exactly one pass
//! runs at a time; a failed pass leaves the queue untouched so the next
//! trigger retries it.

mod accept;
mod apply;
mod state;

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use chrono::Utc;
use note_storage::{EntryStorage, FsStorage, StoragePath};
use tokio::sync::{Notify, watch};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::config::SyncConfig;
use crate::diff::{DiffDecisionMap, SyncDiffEntry, compute_diff};
use crate::identity::ContentIdentity;
use crate::metadata::{FileMetadataStore, SyncMetadataPatch, SyncMetadataStorage};
use crate::result::{PendingConflict, SyncErrorRecord, SyncResult};
use crate::snapshot::SnapshotBuilder;
use crate::transport::SyncTransport;

pub use state::SyncStatus;
use apply::{Applied, apply_result};
use state::WorkerState;

/// Reconciles a local storage tree with a remote through a transport.
///
/// Shared via `Arc`; all methods take `&self`. Passes are blocking and are
/// meant to run off the async runtime, see [`crate::SyncScheduler`].
pub struct LocalSyncWorker {
    storage: Arc<dyn EntryStorage>,
    transport: Arc<dyn SyncTransport>,
    metadata: Arc<dyn SyncMetadataStorage>,
    state: Mutex<WorkerState>,
    trigger: Notify,
    status_tx: watch::Sender<SyncStatus>,
}

impl LocalSyncWorker {
    pub fn new(
        storage: Arc<dyn EntryStorage>,
        transport: Arc<dyn SyncTransport>,
        metadata: Arc<dyn SyncMetadataStorage>,
    ) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());
        Self {
            storage,
            transport,
            metadata,
            state: Mutex::new(WorkerState::default()),
            trigger: Notify::new(),
            status_tx,
        }
    }

    /// Worker over the directory at `root`, with metadata stored inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be resolved.
    pub fn open(root: &Path, transport: Arc<dyn SyncTransport>, config: &SyncConfig) -> Result<Self> {
        let storage = FsStorage::new(root)?.with_ignored(config.ignored.iter().cloned());
        let metadata = FileMetadataStore::new(config.metadata_path(storage.root()));
        Ok(Self::new(Arc::new(storage), transport, Arc::new(metadata)))
    }

    fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &WorkerState) {
        self.status_tx.send_replace(state.status());
    }

    /// Queue `path` for the next pass.
    ///
    /// Ignored when `path` or one of its ancestors is already queued. Wakes
    /// the scheduler unless a pass is running; the running pass drains the
    /// queue anyway.
    pub fn add_root(&self, path: StoragePath) {
        let mut state = self.lock();
        if !state.enqueue_root(path.clone()) {
            debug!(path = %path, "Root already covered by the queue");
            return;
        }
        debug!(path = %path, queued = state.pending_roots.len(), "Queued sync root");
        let syncing = state.syncing_now;
        self.publish(&state);
        drop(state);

        if !syncing {
            self.trigger();
        }
    }

    /// Ask the scheduler for a pass.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    pub(crate) async fn triggered(&self) {
        self.trigger.notified().await;
    }

    /// Resolve the conflict at `path` in favor of the local side.
    ///
    /// `conflict_identity` is the remote identity the decision was based on.
    /// It travels with the next snapshot so the remote can refuse a stale
    /// resolution.
    pub fn force_resolve(&self, path: StoragePath, conflict_identity: Option<ContentIdentity>) {
        self.lock()
            .force_resolve
            .insert(path.clone(), conflict_identity);
        self.add_root(path);
    }

    /// Run passes until the queue is empty.
    ///
    /// Returns immediately when a pass is already running. On failure the
    /// remaining queue is kept and the error is recorded in the status.
    pub fn run_sync(&self) -> Result<()> {
        {
            let mut state = self.lock();
            if state.syncing_now {
                debug!("Sync already running");
                return Ok(());
            }
            state.syncing_now = true;
            self.publish(&state);
        }
        let _running = RunningPass { worker: self };

        let mut rounds = 0usize;
        loop {
            let root = {
                let mut state = self.lock();
                // add_root reads the flag under this same lock
                let Some(root) = state.pending_roots.front().cloned() else {
                    state.syncing_now = false;
                    state.last_sync_ok = Some(true);
                    state.last_sync_date = Some(Utc::now());
                    state.last_sync_error = None;
                    self.publish(&state);
                    if rounds > 0 {
                        info!(rounds, "Sync finished");
                    }
                    return Ok(());
                };
                root
            };

            if let Err(e) = self.process_root(&root) {
                let mut state = self.lock();
                state.syncing_now = false;
                state.last_sync_ok = Some(false);
                state.last_sync_error = Some(e.to_string());
                error!(error = %e, queued = state.pending_roots.len(), "Sync failed");
                self.publish(&state);
                return Err(e);
            }
            rounds += 1;
        }
    }

    /// One round trip for `root`.
    fn process_root(&self, root: &StoragePath) -> Result<()> {
        let metadata = self.metadata.get()?;
        let (send_data, force_resolve) = {
            let state = self.lock();
            (state.send_data.clone(), state.force_resolve.clone())
        };

        let (snapshot, consumed) =
            SnapshotBuilder::new(&*self.storage, &metadata, &send_data, &force_resolve)
                .build(root)?;
        debug!(
            root = %root,
            with_data = consumed.data.len(),
            forced = consumed.force_resolve.len(),
            "Sending snapshot"
        );

        let results = self.transport.sync(&snapshot)?;
        debug!(root = %root, results = results.len(), "Remote replied");

        {
            let mut state = self.lock();
            for path in &consumed.data {
                state.send_data.remove(path);
            }
            for path in &consumed.force_resolve {
                state.force_resolve.remove(path);
            }
        }

        let mut patch = SyncMetadataPatch::new();
        let mut mentioned = HashSet::new();
        for result in &results {
            match apply_result(&*self.storage, &snapshot, result, &mut patch) {
                Applied::Done => {}
                Applied::DataRequired(path) => {
                    debug!(path = %path, "Remote requested data");
                    let mut state = self.lock();
                    state.send_data.insert(path.clone());
                    state.requeue_front(path);
                }
                Applied::Failed(text) => {
                    warn!(path = %result.path, "{text}");
                    self.lock().record_error(text);
                }
            }
            mentioned.insert(&result.path);
        }

        // Unmentioned entries are in sync with what was sent
        for entry in snapshot.walk_down_to_top() {
            if entry.path.is_root() || mentioned.contains(&entry.path) {
                continue;
            }
            if let Some(identity) = &entry.identity {
                patch.insert(entry.path.clone(), Some(identity.clone()));
            }
        }

        self.metadata.set_multi(&patch)?;

        let now = Utc::now();
        let conflicts: Vec<PendingConflict> = results
            .into_iter()
            .filter(SyncResult::is_conflict)
            .map(|sync_result| PendingConflict {
                ts: now,
                sync_result,
            })
            .collect();
        if !conflicts.is_empty() {
            info!(root = %root, conflicts = conflicts.len(), "Conflicts pending");
        }

        let mut state = self.lock();
        state.pending_conflicts = conflicts;
        state.remove_root(root);
        self.publish(&state);
        Ok(())
    }

    /// Diff the subtree at `start` against the remote outline.
    ///
    /// `decisions` carries accept decisions made on an earlier diff so they
    /// survive the refresh.
    pub fn update_diff(
        &self,
        start: &StoragePath,
        decisions: &DiffDecisionMap,
    ) -> Result<Vec<SyncDiffEntry>> {
        let outline = self.transport.outline(start)?;
        let metadata = self.metadata.get()?;
        compute_diff(&*self.storage, &metadata, outline.as_ref(), start, decisions)
    }

    pub fn status(&self) -> SyncStatus {
        self.lock().status()
    }

    /// Receive a status snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn pending_roots(&self) -> Vec<StoragePath> {
        self.lock().pending_roots.iter().cloned().collect()
    }

    /// Conflicts reported by the most recent round trip.
    pub fn pending_conflicts(&self) -> Vec<PendingConflict> {
        self.lock().pending_conflicts.clone()
    }

    pub fn sync_errors(&self) -> Vec<SyncErrorRecord> {
        self.lock().sync_errors.clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.lock().syncing_now
    }
}

/// Releases the running flag when a pass unwinds.
struct RunningPass<'a> {
    worker: &'a LocalSyncWorker,
}

impl Drop for RunningPass<'_> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        let mut state = self.worker.lock();
        state.syncing_now = false;
        state.last_sync_ok = Some(false);
        state.last_sync_error = Some("Sync pass panicked".to_string());
        self.worker.publish(&state);
    }
}
