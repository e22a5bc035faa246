//! Diff entries and the accept policy

use note_storage::StoragePath;
use serde::{Deserialize, Serialize};

use super::types::{
    DiffAction, EntrySyncMetadata, SyncDiffType, is_clean_local_diff, is_conflicting_diff,
};
use crate::identity::ContentIdentity;
use crate::walk::walk_down_to_top;

/// One path that differs between local and remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDiffEntry {
    pub path: StoragePath,
    #[serde(rename = "type")]
    pub diff_type: SyncDiffType,
    pub actual: Option<ContentIdentity>,
    pub remote: Option<ContentIdentity>,
    pub sync_metadata: Option<EntrySyncMetadata>,
}

impl SyncDiffEntry {
    /// Record `action` as the decision for this entry.
    ///
    /// `accepted` captures the identity of the side the decision reads from,
    /// so a later change to that side can be detected as stale.
    pub fn with_decision(mut self, action: DiffAction) -> Self {
        let mut metadata = self.sync_metadata.take().unwrap_or_default();
        metadata.action = Some(action);
        metadata.diff = Some(self.diff_type);
        metadata.accepted = match should_read_from_local_to_accept(Some(&metadata)) {
            Some(true) => self.actual.clone(),
            Some(false) => self.remote.clone(),
            None => None,
        };
        self.sync_metadata = Some(metadata);
        self
    }

    /// Identity of the side selected by the recorded decision.
    pub fn selected_identity(&self) -> Option<Option<&ContentIdentity>> {
        let read_local = should_read_from_local_to_accept(self.sync_metadata.as_ref())?;
        Some(if read_local {
            self.actual.as_ref()
        } else {
            self.remote.as_ref()
        })
    }
}

/// Decide which side an accept reads its content from.
///
/// `Some(true)` reads local, `Some(false)` reads remote and `None` means no
/// decision can be made from the recorded metadata.
pub fn should_read_from_local_to_accept(metadata: Option<&EntrySyncMetadata>) -> Option<bool> {
    let metadata = metadata?;
    let action = metadata.action?;
    let diff = metadata.diff?;

    if is_conflicting_diff(diff) {
        match action {
            DiffAction::AcceptLocal => Some(true),
            DiffAction::AcceptRemote => Some(false),
            DiffAction::AcceptAuto => None,
        }
    } else if is_clean_local_diff(diff) {
        Some(matches!(action, DiffAction::AcceptAuto | DiffAction::AcceptLocal))
    } else {
        Some(action == DiffAction::AcceptRemote)
    }
}

/// Check whether the content a decision was based on has changed since.
///
/// `None` when there is no decision to check.
pub fn is_accepted_state_lost(diff: &SyncDiffEntry) -> Option<bool> {
    let metadata = diff.sync_metadata.as_ref()?;
    let selected = diff.selected_identity()?;
    Some(selected != metadata.accepted.as_ref())
}

pub fn is_accepted(diff: &SyncDiffEntry) -> bool {
    diff.sync_metadata
        .as_ref()
        .is_some_and(|m| m.accepted == diff.actual)
}

/// True if the entry carries a decision that can be processed as a job.
pub fn is_actionable(diff: &SyncDiffEntry) -> bool {
    diff.sync_metadata
        .as_ref()
        .is_some_and(|m| m.action.is_some() && m.diff.is_some())
}

/// Order diff entries deepest path first.
pub fn walk_sync_diff_entries_down_to_top(entries: &[SyncDiffEntry]) -> Vec<&SyncDiffEntry> {
    walk_down_to_top(entries.iter(), |entry| &entry.path)
}
