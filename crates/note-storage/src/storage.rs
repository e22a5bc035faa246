//! The storage contract consumed by the sync core

use serde::{Deserialize, Serialize};

use crate::{Result, StoragePath};

/// Metadata about a single storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
    pub is_directory: bool,
    /// Byte length for files, zero for directories
    pub size: u64,
}

impl EntryStats {
    pub fn directory() -> Self {
        Self {
            is_directory: true,
            size: 0,
        }
    }

    pub fn file(size: u64) -> Self {
        Self {
            is_directory: false,
            size,
        }
    }
}

/// Hierarchical entry storage.
///
/// Every operation fails with a typed [`crate::Error`]: `NotExists` for a
/// missing entry, `NotDirectory` when listing or descending through a file,
/// `IsDirectory` when reading or overwriting a directory as bytes and
/// `AlreadyExists` when creating a directory over an existing entry.
pub trait EntryStorage: Send + Sync {
    /// Stats of an existing entry.
    fn stats(&self, path: &StoragePath) -> Result<EntryStats>;

    /// Full contents of a file.
    fn read(&self, path: &StoragePath) -> Result<Vec<u8>>;

    /// Replace or create a file, creating missing parent directories.
    fn write_or_create(&self, path: &StoragePath, data: &[u8]) -> Result<()>;

    /// Create a directory, creating missing parent directories.
    fn create_dir(&self, path: &StoragePath) -> Result<()>;

    /// Remove a file, or a directory together with its subtree.
    fn remove(&self, path: &StoragePath) -> Result<()>;

    /// Direct children of a directory in name order.
    fn children(&self, path: &StoragePath) -> Result<Vec<StoragePath>>;

    fn exists(&self, path: &StoragePath) -> Result<bool> {
        match self.stats(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_exists() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// A storage bound to one path, for call sites that work entry by entry.
pub struct StorageEntryPointer<'a> {
    storage: &'a dyn EntryStorage,
    path: StoragePath,
}

impl<'a> StorageEntryPointer<'a> {
    pub fn new(storage: &'a dyn EntryStorage, path: StoragePath) -> Self {
        Self { storage, path }
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    pub fn stats(&self) -> Result<EntryStats> {
        self.storage.stats(&self.path)
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.storage.read(&self.path)
    }

    pub fn write_or_create(&self, data: &[u8]) -> Result<()> {
        self.storage.write_or_create(&self.path, data)
    }

    pub fn create_dir(&self) -> Result<()> {
        self.storage.create_dir(&self.path)
    }

    pub fn remove(&self) -> Result<()> {
        self.storage.remove(&self.path)
    }

    pub fn children(&self) -> Result<Vec<StorageEntryPointer<'a>>> {
        Ok(self
            .storage
            .children(&self.path)?
            .into_iter()
            .map(|path| StorageEntryPointer::new(self.storage, path))
            .collect())
    }

    pub fn exists(&self) -> Result<bool> {
        self.storage.exists(&self.path)
    }
}

impl dyn EntryStorage + '_ {
    /// Pointer to the entry at `path`. The entry does not need to exist.
    pub fn get(&self, path: StoragePath) -> StorageEntryPointer<'_> {
        StorageEntryPointer::new(self, path)
    }
}
