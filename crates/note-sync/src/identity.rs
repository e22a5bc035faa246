//! Content identities
//!
//! A content identity fingerprints what a path holds without carrying the
//! bytes: `sha256:<hex>` for a file, the reserved `dir` marker for a
//! directory. A missing path has no identity at all, which is modelled as
//! `Option<ContentIdentity>::None` throughout the crate.

use std::fmt;

use note_storage::{EntryStorage, StoragePath, checksum};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Reserved identity value for directories
pub const DIR_IDENTITY: &str = "dir";

/// Opaque, comparable fingerprint of an entry's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIdentity(String);

impl ContentIdentity {
    /// Wrap an identity received from elsewhere (remote, metadata file).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identity of a file holding `data`.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(checksum::compute_checksum(data))
    }

    /// The directory marker.
    pub fn directory() -> Self {
        Self(DIR_IDENTITY.to_string())
    }

    pub fn is_dir(&self) -> bool {
        self.0 == DIR_IDENTITY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Test an optional identity for the directory marker.
pub fn is_dir_identity(identity: Option<&ContentIdentity>) -> bool {
    identity.is_some_and(ContentIdentity::is_dir)
}

/// Compute the current identity of `path`, or `None` if it does not exist.
///
/// Any storage failure other than a missing entry is propagated.
pub fn identify(storage: &dyn EntryStorage, path: &StoragePath) -> Result<Option<ContentIdentity>> {
    let stats = match storage.stats(path) {
        Ok(stats) => stats,
        Err(e) if e.is_not_exists() => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if stats.is_directory {
        return Ok(Some(ContentIdentity::directory()));
    }

    match storage.read(path) {
        Ok(data) => Ok(Some(ContentIdentity::of_bytes(&data))),
        Err(e) if e.is_not_exists() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use note_storage::MemoryStorage;

    #[test]
    fn equal_bytes_give_equal_identities() {
        assert_eq!(ContentIdentity::of_bytes(b"x"), ContentIdentity::of_bytes(b"x"));
        assert_ne!(ContentIdentity::of_bytes(b"x"), ContentIdentity::of_bytes(b"y"));
    }

    #[test]
    fn directory_marker_is_distinct_from_file_identities() {
        let dir = ContentIdentity::directory();
        assert!(dir.is_dir());
        assert!(!ContentIdentity::of_bytes(b"dir").is_dir());
        assert!(is_dir_identity(Some(&dir)));
        assert!(!is_dir_identity(None));
    }

    #[test]
    fn identify_follows_storage_state() {
        let storage = MemoryStorage::new();
        let file = StoragePath::new("/a/b.md");
        storage.write_or_create(&file, b"content").unwrap();

        assert_eq!(
            identify(&storage, &file).unwrap(),
            Some(ContentIdentity::of_bytes(b"content"))
        );
        assert_eq!(
            identify(&storage, &StoragePath::new("/a")).unwrap(),
            Some(ContentIdentity::directory())
        );
        assert_eq!(identify(&storage, &StoragePath::new("/nope")).unwrap(), None);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&ContentIdentity::directory()).unwrap();
        assert_eq!(json, "\"dir\"");
    }
}
