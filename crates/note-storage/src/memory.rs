//! In-memory entry storage

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{EntryStats, EntryStorage, Error, Result, StoragePath};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// Entry storage kept entirely in memory.
///
/// Entries are indexed by normalized path; the root directory always exists.
#[derive(Debug)]
pub struct MemoryStorage {
    nodes: RwLock<BTreeMap<StoragePath, Node>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(StoragePath::root(), Node::Dir);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn nodes(&self) -> RwLockReadGuard<'_, BTreeMap<StoragePath, Node>> {
        self.nodes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn nodes_mut(&self) -> RwLockWriteGuard<'_, BTreeMap<StoragePath, Node>> {
        self.nodes.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create every missing ancestor of `path` as a directory.
    fn ensure_parents(nodes: &mut BTreeMap<StoragePath, Node>, path: &StoragePath) -> Result<()> {
        let mut ancestors = Vec::new();
        let mut current = path.parent_dir();
        while !current.is_root() {
            ancestors.push(current.clone());
            current = current.parent_dir();
        }

        for ancestor in ancestors.into_iter().rev() {
            match nodes.get(&ancestor) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => return Err(Error::NotDirectory { path: ancestor }),
                None => {
                    nodes.insert(ancestor, Node::Dir);
                }
            }
        }
        Ok(())
    }
}

impl EntryStorage for MemoryStorage {
    fn stats(&self, path: &StoragePath) -> Result<EntryStats> {
        match self.nodes().get(path) {
            Some(Node::Dir) => Ok(EntryStats::directory()),
            Some(Node::File(data)) => Ok(EntryStats::file(data.len() as u64)),
            None => Err(Error::NotExists { path: path.clone() }),
        }
    }

    fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        match self.nodes().get(path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(Error::IsDirectory { path: path.clone() }),
            None => Err(Error::NotExists { path: path.clone() }),
        }
    }

    fn write_or_create(&self, path: &StoragePath, data: &[u8]) -> Result<()> {
        let mut nodes = self.nodes_mut();
        if let Some(Node::Dir) = nodes.get(path) {
            return Err(Error::IsDirectory { path: path.clone() });
        }
        Self::ensure_parents(&mut nodes, path)?;
        nodes.insert(path.clone(), Node::File(data.to_vec()));
        Ok(())
    }

    fn create_dir(&self, path: &StoragePath) -> Result<()> {
        let mut nodes = self.nodes_mut();
        if nodes.contains_key(path) {
            return Err(Error::AlreadyExists { path: path.clone() });
        }
        Self::ensure_parents(&mut nodes, path)?;
        nodes.insert(path.clone(), Node::Dir);
        Ok(())
    }

    fn remove(&self, path: &StoragePath) -> Result<()> {
        if path.is_root() {
            return Err(Error::RootModification);
        }
        let mut nodes = self.nodes_mut();
        if nodes.remove(path).is_none() {
            return Err(Error::NotExists { path: path.clone() });
        }
        nodes.retain(|key, _| !key.inside(path, false));
        Ok(())
    }

    fn children(&self, path: &StoragePath) -> Result<Vec<StoragePath>> {
        let nodes = self.nodes();
        match nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => return Err(Error::NotDirectory { path: path.clone() }),
            None => return Err(Error::NotExists { path: path.clone() }),
        }

        Ok(nodes
            .keys()
            .filter(|key| !key.is_root() && &key.parent_dir() == path)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_through_file_parent_fails() {
        let storage = MemoryStorage::new();
        storage
            .write_or_create(&StoragePath::new("/a"), b"file")
            .unwrap();

        let err = storage
            .write_or_create(&StoragePath::new("/a/b.md"), b"nested")
            .unwrap_err();
        assert!(matches!(err, Error::NotDirectory { .. }));
    }

    #[test]
    fn root_cannot_be_removed() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.remove(&StoragePath::root()),
            Err(Error::RootModification)
        ));
    }
}
