//! Worker state and status snapshots

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use note_storage::StoragePath;
use serde::{Deserialize, Serialize};

use crate::identity::ContentIdentity;
use crate::result::{PendingConflict, SyncErrorRecord};

/// Mutable state shared between the pass loop and the public API.
#[derive(Debug, Default)]
pub(crate) struct WorkerState {
    /// Roots waiting for a round trip, front first
    pub pending_roots: VecDeque<StoragePath>,
    /// Paths whose bytes go out with the next snapshot
    pub send_data: HashSet<StoragePath>,
    /// Paths whose conflict the next snapshot resolves in favor of local
    pub force_resolve: HashMap<StoragePath, Option<ContentIdentity>>,
    pub syncing_now: bool,
    pub last_sync_ok: Option<bool>,
    pub last_sync_date: Option<DateTime<Utc>>,
    pub last_sync_error: Option<String>,
    pub sync_errors: Vec<SyncErrorRecord>,
    pub pending_conflicts: Vec<PendingConflict>,
}

impl WorkerState {
    /// Queue `path` unless it is already covered by a queued root.
    ///
    /// Returns whether the queue changed.
    pub fn enqueue_root(&mut self, path: StoragePath) -> bool {
        if self.pending_roots.iter().any(|root| path.inside(root, true)) {
            return false;
        }
        self.pending_roots.push_back(path);
        true
    }

    /// Put `path` in front of the queue so it is processed next.
    pub fn requeue_front(&mut self, path: StoragePath) {
        self.pending_roots.push_front(path);
    }

    /// Drop the first queued occurrence of `path`.
    pub fn remove_root(&mut self, path: &StoragePath) {
        if let Some(index) = self.pending_roots.iter().position(|root| root == path) {
            self.pending_roots.remove(index);
        }
    }

    pub fn record_error(&mut self, text: String) {
        self.sync_errors.push(SyncErrorRecord {
            ts: Utc::now(),
            text,
        });
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            syncing_now: self.syncing_now,
            last_sync_ok: self.last_sync_ok,
            last_sync_date: self.last_sync_date,
            last_sync_error: self.last_sync_error.clone(),
            pending_roots: self.pending_roots.len(),
            pending_conflicts: self.pending_conflicts.len(),
            sync_errors: self.sync_errors.len(),
        }
    }
}

/// Point-in-time view of the worker, published after every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub syncing_now: bool,
    /// `None` until the first pass finishes
    pub last_sync_ok: Option<bool>,
    /// Time of the last successful pass
    pub last_sync_date: Option<DateTime<Utc>>,
    pub last_sync_error: Option<String>,
    pub pending_roots: usize,
    pub pending_conflicts: usize,
    pub sync_errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(state: &WorkerState) -> Vec<&str> {
        state.pending_roots.iter().map(StoragePath::as_str).collect()
    }

    #[test]
    fn covered_roots_are_not_queued_twice() {
        let mut state = WorkerState::default();

        assert!(state.enqueue_root(StoragePath::new("/notes")));
        assert!(!state.enqueue_root(StoragePath::new("/notes")));
        assert!(!state.enqueue_root(StoragePath::new("/notes/a.md")));
        assert!(state.enqueue_root(StoragePath::new("/notes-old")));

        assert_eq!(queued(&state), vec!["/notes", "/notes-old"]);
    }

    #[test]
    fn narrower_roots_survive_a_wider_one() {
        let mut state = WorkerState::default();

        state.enqueue_root(StoragePath::new("/notes/a.md"));
        state.enqueue_root(StoragePath::new("/notes"));

        assert_eq!(queued(&state), vec!["/notes/a.md", "/notes"]);
    }

    #[test]
    fn remove_root_takes_the_first_occurrence_only() {
        let mut state = WorkerState::default();
        state.enqueue_root(StoragePath::new("/a"));
        state.requeue_front(StoragePath::new("/b"));
        state.enqueue_root(StoragePath::new("/c"));
        state.requeue_front(StoragePath::new("/a"));

        state.remove_root(&StoragePath::new("/a"));

        assert_eq!(queued(&state), vec!["/b", "/a", "/c"]);
    }
}
