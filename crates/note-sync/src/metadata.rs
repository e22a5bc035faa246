//! Sync metadata store
//!
//! Records, per normalized path, the identity both sides agreed on at the last
//! confirmed sync. Each pass persists its findings as one merge-patch; a patch
//! lands completely or not at all.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use note_storage::{StoragePath, io};

use crate::identity::ContentIdentity;
use crate::{Error, Result};

/// Normalized path → last synced identity.
pub type SyncMetadataMap = BTreeMap<StoragePath, ContentIdentity>;

/// Merge-patch for a [`SyncMetadataMap`]: `None` deletes, `Some` upserts.
pub type SyncMetadataPatch = BTreeMap<StoragePath, Option<ContentIdentity>>;

/// Persistence for sync metadata.
pub trait SyncMetadataStorage: Send + Sync {
    /// Read the full map.
    fn get(&self) -> Result<SyncMetadataMap>;

    /// Apply `patch` as a single atomic write.
    fn set_multi(&self, patch: &SyncMetadataPatch) -> Result<()>;
}

/// Apply a patch to a map in place.
pub fn merge_patch(map: &mut SyncMetadataMap, patch: &SyncMetadataPatch) {
    for (path, identity) in patch {
        match identity {
            Some(identity) => {
                map.insert(path.clone(), identity.clone());
            }
            None => {
                map.remove(path);
            }
        }
    }
}

/// Metadata kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    map: Mutex<SyncMetadataMap>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: SyncMetadataMap) -> Self {
        Self {
            map: Mutex::new(entries),
        }
    }
}

impl SyncMetadataStorage for MemoryMetadataStore {
    fn get(&self) -> Result<SyncMetadataMap> {
        Ok(self.map.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn set_multi(&self, patch: &SyncMetadataPatch) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        merge_patch(&mut map, patch);
        Ok(())
    }
}

/// Metadata persisted as a JSON document on disk.
///
/// Writers serialize on an exclusive lock held on a sidecar `.lock` file, then
/// replace the document with write-to-temp-then-rename. A crash mid-write
/// leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    path: PathBuf,
}

impl FileMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn open_lock(&self) -> Result<File> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?)
    }

    fn read_map(&self) -> Result<SyncMetadataMap> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SyncMetadataMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Ok(SyncMetadataMap::new());
        }
        serde_json::from_str(&content).map_err(|e| Error::Metadata {
            message: format!("{}: {}", self.path.display(), e),
        })
    }
}

impl SyncMetadataStorage for FileMetadataStore {
    fn get(&self) -> Result<SyncMetadataMap> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        // Lock released when `lock` is dropped
        self.read_map()
    }

    fn set_multi(&self, patch: &SyncMetadataPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let mut map = self.read_map()?;
        merge_patch(&mut map, patch);

        let content = serde_json::to_string_pretty(&map)?;
        io::write_atomic(&self.path, content.as_bytes())?;

        tracing::debug!(path = %self.path.display(), changes = patch.len(), "Sync metadata saved");
        Ok(())
    }
}
