//! Filesystem-backed entry storage

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{EntryStats, EntryStorage, Error, Result, StoragePath, io};

/// Entry storage rooted at a directory on disk.
///
/// Storage paths map onto the root by their relative form; `..` never
/// survives normalization so every mapped path stays below the root.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    ignored: Vec<String>,
}

impl FsStorage {
    /// Open a storage rooted at `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
        if !root.is_dir() {
            return Err(Error::NotDirectory {
                path: StoragePath::root(),
            });
        }
        Ok(Self {
            root,
            ignored: Vec::new(),
        })
    }

    /// Skip entries with these names when listing directories.
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Native location of a storage path.
    pub fn to_native(&self, path: &StoragePath) -> PathBuf {
        path.parts()
            .into_iter()
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    fn map_io(&self, path: &StoragePath, native: &Path, err: std::io::Error) -> Error {
        match err.kind() {
            ErrorKind::NotFound => Error::NotExists { path: path.clone() },
            ErrorKind::AlreadyExists => Error::AlreadyExists { path: path.clone() },
            _ => Error::io(native, err),
        }
    }

    /// Fail with `NotDirectory` if any ancestor of `path` is a file.
    fn check_ancestors(&self, path: &StoragePath) -> Result<()> {
        let mut current = path.parent_dir();
        while !current.is_root() {
            let native = self.to_native(&current);
            if native.is_file() {
                return Err(Error::NotDirectory { path: current });
            }
            current = current.parent_dir();
        }
        Ok(())
    }
}

impl EntryStorage for FsStorage {
    fn stats(&self, path: &StoragePath) -> Result<EntryStats> {
        let native = self.to_native(path);
        let meta = fs::metadata(&native).map_err(|e| self.map_io(path, &native, e))?;
        if meta.is_dir() {
            Ok(EntryStats::directory())
        } else {
            Ok(EntryStats::file(meta.len()))
        }
    }

    fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        let native = self.to_native(path);
        if native.is_dir() {
            return Err(Error::IsDirectory { path: path.clone() });
        }
        fs::read(&native).map_err(|e| self.map_io(path, &native, e))
    }

    fn write_or_create(&self, path: &StoragePath, data: &[u8]) -> Result<()> {
        if path.is_root() {
            return Err(Error::RootModification);
        }
        let native = self.to_native(path);
        if native.is_dir() {
            return Err(Error::IsDirectory { path: path.clone() });
        }
        self.check_ancestors(path)?;
        io::write_atomic(&native, data)
    }

    fn create_dir(&self, path: &StoragePath) -> Result<()> {
        let native = self.to_native(path);
        if native.exists() {
            return Err(Error::AlreadyExists { path: path.clone() });
        }
        self.check_ancestors(path)?;
        fs::create_dir_all(&native).map_err(|e| self.map_io(path, &native, e))
    }

    fn remove(&self, path: &StoragePath) -> Result<()> {
        if path.is_root() {
            return Err(Error::RootModification);
        }
        let native = self.to_native(path);
        let meta = fs::symlink_metadata(&native).map_err(|e| self.map_io(path, &native, e))?;
        let outcome = if meta.is_dir() {
            fs::remove_dir_all(&native)
        } else {
            fs::remove_file(&native)
        };
        outcome.map_err(|e| self.map_io(path, &native, e))
    }

    fn children(&self, path: &StoragePath) -> Result<Vec<StoragePath>> {
        let native = self.to_native(path);
        let meta = fs::metadata(&native).map_err(|e| self.map_io(path, &native, e))?;
        if !meta.is_dir() {
            return Err(Error::NotDirectory { path: path.clone() });
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&native).map_err(|e| self.map_io(path, &native, e))? {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.ignored.iter().any(|ignored| ignored == &name) {
                continue;
            }
            // Leftovers of an interrupted atomic write
            if io::is_temp_name(&name) {
                continue;
            }
            names.push(name);
        }
        names.sort();

        Ok(names.iter().map(|name| path.child(name)).collect())
    }
}
