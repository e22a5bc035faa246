//! [`TestTree`]: a filesystem storage over a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use note_storage::FsStorage;
use tempfile::TempDir;

/// A temporary directory exposed as an [`FsStorage`].
///
/// The directory is removed when the tree is dropped.
pub struct TestTree {
    temp_dir: TempDir,
    storage: FsStorage,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsStorage::new(temp_dir.path()).unwrap();
        Self { temp_dir, storage }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn storage(&self) -> &FsStorage {
        &self.storage
    }

    /// Native path of `relative` inside the tree.
    pub fn native(&self, relative: &str) -> PathBuf {
        self.root().join(relative.trim_start_matches('/'))
    }

    /// Write `content` to `relative`, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.native(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read `relative` as text.
    ///
    /// # Panics
    /// Panics with the path if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let path = self.native(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.native(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn assert_file_not_exists(&self, relative: &str) {
        let path = self.native(relative);
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }
}
