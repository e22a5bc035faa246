//! Turning accept decisions into sync work

use note_storage::StoragePath;
use tracing::{info, warn};

use super::LocalSyncWorker;
use super::apply::update_local_entry;
use crate::diff::{
    DiffAction, SyncDiffEntry, is_accepted_state_lost, is_conflicting_diff,
    should_read_from_local_to_accept, walk_sync_diff_entries_down_to_top,
};
use crate::metadata::SyncMetadataPatch;
use crate::{Error, Result};

impl LocalSyncWorker {
    /// Act on the decision recorded in `diff`.
    ///
    /// Keeping the local side queues the path for the next pass, forcing the
    /// conflict resolution when both sides changed. Taking the remote side
    /// adopts the remote content locally and records it as synced.
    ///
    /// # Errors
    ///
    /// [`Error::AcceptedStateLost`] when the selected side changed since the
    /// decision was made, [`Error::UndecidedAction`] when the decision does
    /// not select a side.
    pub fn accept(&self, diff: &SyncDiffEntry) -> Result<()> {
        if is_accepted_state_lost(diff) == Some(true) {
            return Err(Error::AcceptedStateLost {
                path: diff.path.clone(),
            });
        }

        let Some(read_local) = should_read_from_local_to_accept(diff.sync_metadata.as_ref()) else {
            return Err(Error::UndecidedAction {
                path: diff.path.clone(),
            });
        };

        if !read_local {
            return self.adopt_remote(diff);
        }

        if is_conflicting_diff(diff.diff_type) {
            self.force_resolve(diff.path.clone(), diff.remote.clone());
        } else {
            self.add_root(diff.path.clone());
        }
        Ok(())
    }

    /// Accept several diffs, deepest paths first.
    ///
    /// A failing entry goes to the error log and does not stop the others.
    pub fn accept_multi(&self, diffs: &[SyncDiffEntry]) {
        for diff in walk_sync_diff_entries_down_to_top(diffs) {
            if let Err(e) = self.accept(diff) {
                let text = format!("Failed to accept \"{}\": {e}", diff.path);
                warn!(path = %diff.path, "{text}");
                let mut state = self.lock();
                state.record_error(text);
                self.publish(&state);
            }
        }
    }

    /// Accept every non-conflicting diff at or below `path` automatically.
    pub fn accept_tree(&self, path: &StoragePath, diffs: &[SyncDiffEntry]) {
        let selected: Vec<SyncDiffEntry> = diffs
            .iter()
            .filter(|d| d.path.inside(path, true) && !is_conflicting_diff(d.diff_type))
            .cloned()
            .map(|d| d.with_decision(DiffAction::AcceptAuto))
            .collect();
        self.accept_multi(&selected);
    }

    fn adopt_remote(&self, diff: &SyncDiffEntry) -> Result<()> {
        let path = &diff.path;
        let mut patch = SyncMetadataPatch::new();

        match &diff.remote {
            Some(identity) => {
                let data = if identity.is_dir() {
                    None
                } else {
                    Some(self.transport.read(path)?)
                };
                update_local_entry(self.storage.get(path.clone()), identity, data.as_deref())?;
                patch.insert(path.clone(), Some(identity.clone()));
            }
            None => {
                match self.storage.remove(path) {
                    Err(e) if !e.is_not_exists() => return Err(e.into()),
                    _ => {}
                }
                // Records below a removed directory go with it
                let metadata = self.metadata.get()?;
                for key in metadata.keys().filter(|k| k.inside(path, true)) {
                    patch.insert(key.clone(), None);
                }
            }
        }

        self.metadata.set_multi(&patch)?;
        info!(path = %path, removed = diff.remote.is_none(), "Adopted remote state");
        Ok(())
    }
}
