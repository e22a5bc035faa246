//! Per-path verdicts returned by the remote

use chrono::{DateTime, Utc};
use note_storage::StoragePath;
use serde::{Deserialize, Serialize};

use crate::identity::ContentIdentity;

/// What the remote did, or wants done locally, for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncResultAction {
    /// Remote updated its copy from the snapshot
    Updated,
    /// Remote created the entry from the snapshot
    Created,
    /// Remote removed its copy
    Removed,
    /// Remote needs the bytes to create the entry
    CreateDataRequired,
    /// Remote needs the bytes to update the entry
    UpdateDataRequired,
    /// Local side must create the entry from the result
    LocalCreateRequired,
    /// Local side must update the entry from the result
    LocalUpdateRequired,
    /// Local side must remove the entry
    LocalRemoveRequired,
}

impl SyncResultAction {
    pub fn requires_data(self) -> bool {
        matches!(self, Self::CreateDataRequired | Self::UpdateDataRequired)
    }
}

/// Remote verdict for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub path: StoragePath,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Either an action tag with its payload, or a conflict marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum SyncOutcome {
    Action {
        action: SyncResultAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity: Option<ContentIdentity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Vec<u8>>,
    },
    Conflict {
        conflict: ConflictMarker,
    },
}

/// Conflict details as seen by the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictMarker {
    /// Remote identity at the moment the conflict was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ContentIdentity>,
}

impl SyncResult {
    pub fn action(
        path: impl Into<StoragePath>,
        action: SyncResultAction,
        identity: Option<ContentIdentity>,
    ) -> Self {
        Self {
            path: path.into(),
            outcome: SyncOutcome::Action {
                action,
                identity,
                data: None,
            },
        }
    }

    pub fn with_data(
        path: impl Into<StoragePath>,
        action: SyncResultAction,
        identity: ContentIdentity,
        data: Vec<u8>,
    ) -> Self {
        Self {
            path: path.into(),
            outcome: SyncOutcome::Action {
                action,
                identity: Some(identity),
                data: Some(data),
            },
        }
    }

    pub fn conflict(path: impl Into<StoragePath>, remote: Option<ContentIdentity>) -> Self {
        Self {
            path: path.into(),
            outcome: SyncOutcome::Conflict {
                conflict: ConflictMarker { identity: remote },
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Conflict { .. })
    }
}

/// A conflict found during the most recent round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConflict {
    pub ts: DateTime<Utc>,
    pub sync_result: SyncResult,
}

/// A non-fatal failure recorded while applying results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncErrorRecord {
    pub ts: DateTime<Utc>,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_result_wire_shape() {
        let result = SyncResult::action(
            "/a.md",
            SyncResultAction::Updated,
            Some(ContentIdentity::new("sha256:1")),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "path": "/a.md", "action": "updated", "identity": "sha256:1" })
        );
        let back: SyncResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn conflict_result_is_recognized_on_the_wire() {
        let json = serde_json::json!({ "path": "/c.md", "conflict": { "identity": "sha256:r" } });
        let result: SyncResult = serde_json::from_value(json).unwrap();
        assert!(result.is_conflict());
        assert_eq!(result.path, StoragePath::new("/c.md"));
    }

    #[test]
    fn only_data_requests_require_data() {
        assert!(SyncResultAction::CreateDataRequired.requires_data());
        assert!(SyncResultAction::UpdateDataRequired.requires_data());
        assert!(!SyncResultAction::LocalCreateRequired.requires_data());
    }
}
