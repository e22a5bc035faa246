//! Sync snapshot builder
//!
//! Builds the [`SyncEntry`] tree for one round trip. Live storage listings are
//! merged with "ghost" entries: paths that metadata still records as synced
//! but that no longer exist locally. Ghosts tell the remote that something it
//! may still hold is gone here. Every path known to either source appears
//! exactly once.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use note_storage::{EntryStorage, StoragePath};

use crate::entry::SyncEntry;
use crate::identity::{ContentIdentity, identify};
use crate::metadata::SyncMetadataMap;
use crate::{Error, Result};

/// One-shot flags that a snapshot actually carried.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsumedFlags {
    pub data: Vec<StoragePath>,
    pub force_resolve: Vec<StoragePath>,
}

pub struct SnapshotBuilder<'a> {
    storage: &'a dyn EntryStorage,
    metadata: &'a SyncMetadataMap,
    send_data: &'a HashSet<StoragePath>,
    force_resolve: &'a HashMap<StoragePath, Option<ContentIdentity>>,
    /// parent → metadata keys directly below it
    known_children: BTreeMap<StoragePath, BTreeSet<StoragePath>>,
    consumed: ConsumedFlags,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(
        storage: &'a dyn EntryStorage,
        metadata: &'a SyncMetadataMap,
        send_data: &'a HashSet<StoragePath>,
        force_resolve: &'a HashMap<StoragePath, Option<ContentIdentity>>,
    ) -> Self {
        let mut known_children: BTreeMap<StoragePath, BTreeSet<StoragePath>> = BTreeMap::new();
        for path in metadata.keys().filter(|p| !p.is_root()) {
            known_children
                .entry(path.parent_dir())
                .or_default()
                .insert(path.clone());
        }

        Self {
            storage,
            metadata,
            send_data,
            force_resolve,
            known_children,
            consumed: ConsumedFlags::default(),
        }
    }

    /// Build the tree rooted at `root` and report which one-shot flags it used.
    pub fn build(mut self, root: &StoragePath) -> Result<(SyncEntry, ConsumedFlags)> {
        let entry = self.entry(root, true)?;
        Ok((entry, self.consumed))
    }

    fn entry(&mut self, path: &StoragePath, live: bool) -> Result<SyncEntry> {
        let identity = if live {
            identify(self.storage, path)?
        } else {
            None
        };

        let mut entry = SyncEntry::new(path.clone());
        entry.synced = self.metadata.get(path).cloned();
        entry.identity = identity;

        if entry.identity.is_some() && self.send_data.contains(path) {
            let data = self.storage.read(path).map_err(|e| {
                tracing::warn!(path = %path, error = %e, "Requested data is unavailable");
                Error::MissingData { path: path.clone() }
            })?;
            entry.data = Some(data);
            self.consumed.data.push(path.clone());
        }

        if let Some(conflict_identity) = self.force_resolve.get(path) {
            entry.force_conflict_resolve = true;
            entry.conflict_identity = conflict_identity.clone();
            self.consumed.force_resolve.push(path.clone());
        }

        let is_dir = entry.identity.as_ref().is_some_and(ContentIdentity::is_dir);
        entry.children = self.children(path, is_dir)?;
        Ok(entry)
    }

    fn children(&mut self, path: &StoragePath, live_dir: bool) -> Result<Vec<SyncEntry>> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();

        if live_dir {
            for child in self.storage.children(path)? {
                result.push(self.entry(&child, true)?);
                seen.insert(child);
            }
        }

        let ghosts: Vec<StoragePath> = self
            .known_children
            .get(path)
            .map(|keys| keys.iter().filter(|k| !seen.contains(*k)).cloned().collect())
            .unwrap_or_default();
        for ghost in ghosts {
            result.push(self.entry(&ghost, false)?);
        }

        Ok(result)
    }
}
