//! Diff classification types

use serde::{Deserialize, Serialize};

use crate::identity::ContentIdentity;

/// How one path differs between local, remote and the last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncDiffType {
    LocalCreate,
    LocalUpdate,
    LocalRemove,
    RemoteCreate,
    RemoteUpdate,
    RemoteRemove,
    /// Created on both sides with different content
    ConflictingCreate,
    /// Updated on both sides with different content
    ConflictingUpdate,
    /// Removed locally, changed remotely
    ConflictingLocalRemove,
    /// Removed remotely, changed locally
    ConflictingRemoteRemove,
}

impl SyncDiffType {
    pub const ALL: [SyncDiffType; 10] = [
        Self::LocalCreate,
        Self::LocalUpdate,
        Self::LocalRemove,
        Self::RemoteCreate,
        Self::RemoteUpdate,
        Self::RemoteRemove,
        Self::ConflictingCreate,
        Self::ConflictingUpdate,
        Self::ConflictingLocalRemove,
        Self::ConflictingRemoteRemove,
    ];
}

/// True exactly for the four `Conflicting*` types.
pub fn is_conflicting_diff(diff: SyncDiffType) -> bool {
    matches!(
        diff,
        SyncDiffType::ConflictingCreate
            | SyncDiffType::ConflictingUpdate
            | SyncDiffType::ConflictingLocalRemove
            | SyncDiffType::ConflictingRemoteRemove
    )
}

pub fn is_clean_local_diff(diff: SyncDiffType) -> bool {
    matches!(
        diff,
        SyncDiffType::LocalCreate | SyncDiffType::LocalUpdate | SyncDiffType::LocalRemove
    )
}

pub fn is_clean_remote_diff(diff: SyncDiffType) -> bool {
    matches!(
        diff,
        SyncDiffType::RemoteCreate | SyncDiffType::RemoteUpdate | SyncDiffType::RemoteRemove
    )
}

/// A decision resolving a diff to a definitive content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffAction {
    AcceptAuto,
    AcceptLocal,
    AcceptRemote,
}

/// Per-path sync bookkeeping seen by the review layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySyncMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<ContentIdentity>,
    /// Identity the decision was based on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<ContentIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DiffAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<SyncDiffType>,
}

/// Classify one path from its synced, local and remote identities.
///
/// Returns `None` when local and remote agree, whatever the sync record says.
pub fn classify(
    synced: Option<&ContentIdentity>,
    actual: Option<&ContentIdentity>,
    remote: Option<&ContentIdentity>,
) -> Option<SyncDiffType> {
    if actual == remote {
        return None;
    }

    if actual == synced {
        // Only remote moved
        return Some(match (synced, remote) {
            (None, _) => SyncDiffType::RemoteCreate,
            (_, None) => SyncDiffType::RemoteRemove,
            _ => SyncDiffType::RemoteUpdate,
        });
    }

    if remote == synced {
        // Only local moved
        return Some(match (synced, actual) {
            (None, _) => SyncDiffType::LocalCreate,
            (_, None) => SyncDiffType::LocalRemove,
            _ => SyncDiffType::LocalUpdate,
        });
    }

    Some(match (synced, actual, remote) {
        (_, None, _) => SyncDiffType::ConflictingLocalRemove,
        (_, _, None) => SyncDiffType::ConflictingRemoteRemove,
        (None, _, _) => SyncDiffType::ConflictingCreate,
        _ => SyncDiffType::ConflictingUpdate,
    })
}
