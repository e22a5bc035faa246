//! Computing diffs between the local tree and a remote outline

use std::collections::{BTreeMap, BTreeSet};

use note_storage::{EntryStorage, StoragePath};

use super::entry::SyncDiffEntry;
use super::types::{EntrySyncMetadata, classify};
use crate::Result;
use crate::entry::SyncOutlineEntry;
use crate::identity::{ContentIdentity, identify};
use crate::metadata::SyncMetadataMap;

/// Accept decisions recorded per path.
pub type DiffDecisionMap = BTreeMap<StoragePath, EntrySyncMetadata>;

/// Build the outline of the subtree at `path`, `None` if it does not exist.
pub fn build_outline(
    storage: &dyn EntryStorage,
    path: &StoragePath,
) -> Result<Option<SyncOutlineEntry>> {
    let stats = match storage.stats(path) {
        Ok(stats) => stats,
        Err(e) if e.is_not_exists() => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let Some(identity) = identify(storage, path)? else {
        return Ok(None);
    };

    let mut children = Vec::new();
    if stats.is_directory {
        for child in storage.children(path)? {
            if let Some(outline) = build_outline(storage, &child)? {
                children.push(outline);
            }
        }
    }

    Ok(Some(SyncOutlineEntry {
        name: path.basename().to_string(),
        identity,
        stats,
        children,
    }))
}

fn collect_local(
    storage: &dyn EntryStorage,
    path: &StoragePath,
    out: &mut BTreeMap<StoragePath, ContentIdentity>,
) -> Result<()> {
    let Some(identity) = identify(storage, path)? else {
        return Ok(());
    };
    let is_dir = identity.is_dir();
    out.insert(path.clone(), identity);

    if is_dir {
        for child in storage.children(path)? {
            collect_local(storage, &child, out)?;
        }
    }
    Ok(())
}

/// Classify every path under `start` known locally, remotely or to metadata.
///
/// Entries come back in path order. Paths where local and remote agree are
/// omitted.
pub fn compute_diff(
    storage: &dyn EntryStorage,
    metadata: &SyncMetadataMap,
    remote: Option<&SyncOutlineEntry>,
    start: &StoragePath,
    decisions: &DiffDecisionMap,
) -> Result<Vec<SyncDiffEntry>> {
    let mut local = BTreeMap::new();
    collect_local(storage, start, &mut local)?;

    let remote: BTreeMap<StoragePath, ContentIdentity> = remote
        .map(|outline| outline.identities(start).into_iter().collect())
        .unwrap_or_default();

    let mut paths: BTreeSet<&StoragePath> = local.keys().chain(remote.keys()).collect();
    paths.extend(metadata.keys().filter(|p| p.inside(start, true)));

    let mut entries = Vec::new();
    for path in paths {
        let synced = metadata.get(path);
        let actual = local.get(path);
        let remote_identity = remote.get(path);

        let Some(diff_type) = classify(synced, actual, remote_identity) else {
            continue;
        };

        let sync_metadata = match decisions.get(path) {
            Some(decision) => Some(EntrySyncMetadata {
                synced: synced.cloned(),
                ..decision.clone()
            }),
            None => synced.map(|s| EntrySyncMetadata {
                synced: Some(s.clone()),
                ..Default::default()
            }),
        };

        entries.push(SyncDiffEntry {
            path: path.clone(),
            diff_type,
            actual: actual.cloned(),
            remote: remote_identity.cloned(),
            sync_metadata,
        });
    }

    Ok(entries)
}
