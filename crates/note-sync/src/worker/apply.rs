//! Applying remote verdicts to local storage and the metadata patch

use note_storage::{EntryStorage, StorageEntryPointer, StoragePath};

use crate::entry::SyncEntry;
use crate::identity::{ContentIdentity, is_dir_identity};
use crate::metadata::SyncMetadataPatch;
use crate::result::{SyncOutcome, SyncResult, SyncResultAction};
use crate::{Error, Result};

/// What applying one result means for the worker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Applied {
    /// Patch updated or nothing to record
    Done,
    /// Remote wants the bytes of this path on the next round trip
    DataRequired(StoragePath),
    /// Non-fatal failure for the error log
    Failed(String),
}

/// Apply one result, recording metadata changes into `patch`.
///
/// `snapshot` is the tree that was sent; its identities fill in for
/// confirmations that arrive without one.
pub(crate) fn apply_result(
    storage: &dyn EntryStorage,
    snapshot: &SyncEntry,
    result: &SyncResult,
    patch: &mut SyncMetadataPatch,
) -> Applied {
    let SyncOutcome::Action {
        action,
        identity,
        data,
    } = &result.outcome
    else {
        return Applied::Done;
    };
    let path = &result.path;

    match action {
        SyncResultAction::Created | SyncResultAction::Updated => {
            let identity = identity
                .clone()
                .or_else(|| snapshot.find(path).and_then(|e| e.identity.clone()));
            match identity {
                Some(identity) => {
                    patch.insert(path.clone(), Some(identity));
                    Applied::Done
                }
                None => Applied::Failed(format!(
                    "Failed to record \"{path}\": {}",
                    Error::MissingIdentity { path: path.clone() }
                )),
            }
        }

        SyncResultAction::Removed => {
            patch.insert(path.clone(), None);
            Applied::Done
        }

        SyncResultAction::CreateDataRequired | SyncResultAction::UpdateDataRequired => {
            Applied::DataRequired(path.clone())
        }

        SyncResultAction::LocalCreateRequired | SyncResultAction::LocalUpdateRequired => {
            let Some(identity) = identity
                .clone()
                .or_else(|| data.as_deref().map(ContentIdentity::of_bytes))
            else {
                let e = Error::MissingIdentity { path: path.clone() };
                return Applied::Failed(format!("Failed to create/update \"{path}\": {e}"));
            };
            match update_local_entry(storage.get(path.clone()), &identity, data.as_deref()) {
                Ok(()) => {
                    patch.insert(path.clone(), Some(identity));
                    Applied::Done
                }
                Err(e) => Applied::Failed(format!("Failed to create/update \"{path}\": {e}")),
            }
        }

        SyncResultAction::LocalRemoveRequired => match storage.remove(path) {
            Ok(()) => Applied::Done,
            Err(e) if e.is_not_exists() => Applied::Done,
            Err(e) => Applied::Failed(format!("Failed to remove \"{path}\": {e}")),
        },
    }
}

/// Make the local entry match `identity`, writing `data` for files.
///
/// Repeating the same call is a no-op.
pub(crate) fn update_local_entry(
    entry: StorageEntryPointer<'_>,
    identity: &ContentIdentity,
    data: Option<&[u8]>,
) -> Result<()> {
    if is_dir_identity(Some(identity)) {
        match entry.stats() {
            Ok(stats) if !stats.is_directory => entry.remove()?,
            Ok(_) => {}
            Err(e) if e.is_not_exists() => {}
            Err(e) => return Err(e.into()),
        }

        // A nested write may already have created it
        return match entry.create_dir() {
            Err(e) if !e.is_already_exists() => Err(e.into()),
            _ => Ok(()),
        };
    }

    let Some(data) = data else {
        return Err(Error::MissingRemoteData {
            path: entry.path().clone(),
        });
    };
    entry.write_or_create(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use note_storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ContentIdentity {
        ContentIdentity::new(s)
    }

    fn apply(storage: &MemoryStorage, result: SyncResult) -> (Applied, SyncMetadataPatch) {
        let mut patch = SyncMetadataPatch::new();
        let snapshot = SyncEntry::new(StoragePath::root());
        let applied = apply_result(storage, &snapshot, &result, &mut patch);
        (applied, patch)
    }

    #[test]
    fn confirmations_patch_metadata() {
        let storage = MemoryStorage::new();

        let (applied, patch) = apply(
            &storage,
            SyncResult::action("/a.md", SyncResultAction::Updated, Some(id("sha256:1"))),
        );
        assert_eq!(applied, Applied::Done);
        assert_eq!(patch.get(&StoragePath::new("/a.md")), Some(&Some(id("sha256:1"))));

        let (_, patch) = apply(
            &storage,
            SyncResult::action("/x.md", SyncResultAction::Removed, None),
        );
        assert_eq!(patch.get(&StoragePath::new("/x.md")), Some(&None));
    }

    #[test]
    fn confirmation_without_identity_falls_back_to_snapshot() {
        let storage = MemoryStorage::new();
        let mut snapshot = SyncEntry::new(StoragePath::root());
        let mut child = SyncEntry::new(StoragePath::new("/a.md"));
        child.identity = Some(id("sha256:snap"));
        snapshot.children.push(child);

        let mut patch = SyncMetadataPatch::new();
        let result = SyncResult::action("/a.md", SyncResultAction::Created, None);
        apply_result(&storage, &snapshot, &result, &mut patch);

        assert_eq!(patch.get(&StoragePath::new("/a.md")), Some(&Some(id("sha256:snap"))));
    }

    #[test]
    fn data_requests_do_not_touch_the_patch() {
        let storage = MemoryStorage::new();
        let (applied, patch) = apply(
            &storage,
            SyncResult::action("/a.md", SyncResultAction::CreateDataRequired, None),
        );
        assert_eq!(applied, Applied::DataRequired(StoragePath::new("/a.md")));
        assert!(patch.is_empty());
    }

    #[test]
    fn local_write_without_data_is_reported() {
        let storage = MemoryStorage::new();
        let (applied, patch) = apply(
            &storage,
            SyncResult::action(
                "/a.md",
                SyncResultAction::LocalCreateRequired,
                Some(id("sha256:1")),
            ),
        );
        assert!(matches!(applied, Applied::Failed(text) if text.starts_with("Failed to create/update \"/a.md\"")));
        assert!(patch.is_empty());
    }

    #[test]
    fn local_write_derives_identity_from_data() {
        let storage = MemoryStorage::new();
        let result = SyncResult {
            path: StoragePath::new("/a.md"),
            outcome: SyncOutcome::Action {
                action: SyncResultAction::LocalCreateRequired,
                identity: None,
                data: Some(b"hello".to_vec()),
            },
        };

        let (applied, patch) = apply(&storage, result);

        assert_eq!(applied, Applied::Done);
        assert_eq!(
            patch.get(&StoragePath::new("/a.md")),
            Some(&Some(ContentIdentity::of_bytes(b"hello")))
        );
        assert_eq!(storage.read(&StoragePath::new("/a.md")).unwrap(), b"hello");
    }

    #[test]
    fn removing_a_missing_entry_is_quiet() {
        let storage = MemoryStorage::new();
        let (applied, patch) = apply(
            &storage,
            SyncResult::action("/gone.md", SyncResultAction::LocalRemoveRequired, None),
        );
        assert_eq!(applied, Applied::Done);
        assert!(patch.is_empty());
    }

    #[test]
    fn conflicts_are_skipped() {
        let storage = MemoryStorage::new();
        let (applied, patch) = apply(&storage, SyncResult::conflict("/c.md", Some(id("sha256:r"))));
        assert_eq!(applied, Applied::Done);
        assert!(patch.is_empty());
    }
}
