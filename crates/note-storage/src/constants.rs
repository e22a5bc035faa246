//! Well-known paths inside a notes storage.

use crate::StoragePath;

/// Reserved storage locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialPath {
    /// The `.note` directory (workspace settings and plugins)
    SpecialRoot,
    /// The `.note/settings.json` file
    Settings,
    /// The `.sync` directory (sync metadata and settings)
    SyncDir,
    /// The `.sync/settings.json` file
    SyncSettings,
    /// The `.git` directory
    Git,
}

impl SpecialPath {
    /// Get the string representation of the path, relative to the root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpecialRoot => ".note",
            Self::Settings => ".note/settings.json",
            Self::SyncDir => ".sync",
            Self::SyncSettings => ".sync/settings.json",
            Self::Git => ".git",
        }
    }

    pub fn path(&self) -> StoragePath {
        StoragePath::new(self.as_str())
    }
}

impl AsRef<str> for SpecialPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SpecialPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
