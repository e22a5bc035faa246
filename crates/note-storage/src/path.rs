//! Normalized storage paths

use std::fmt;

use serde::{Deserialize, Serialize};

/// A path inside a storage tree, normalized to an absolute forward-slash form.
///
/// Backslashes become forward slashes, empty and `.` segments are dropped and
/// `..` pops a segment without ever climbing above the root. The root itself
/// is `/`. Two paths naming the same entry always compare equal, which makes
/// `StoragePath` usable as a map key for sync metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StoragePath {
    /// Always starts with `/`, never ends with `/` unless it is the root
    inner: String,
}

impl StoragePath {
    /// Create a new StoragePath from any path-like string.
    pub fn new(path: impl AsRef<str>) -> Self {
        let raw = path.as_ref().replace('\\', "/");
        let mut parts: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        Self {
            inner: format!("/{}", parts.join("/")),
        }
    }

    /// The storage root, `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    /// Get the normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Path segments below the root. The root has none.
    pub fn parts(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.inner[1..].split('/').collect()
        }
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.inner.matches('/').count()
        }
    }

    /// Last segment, empty for the root.
    pub fn basename(&self) -> &str {
        match self.inner.rfind('/') {
            Some(idx) => &self.inner[idx + 1..],
            None => "",
        }
    }

    /// Parent directory. The root is its own parent.
    pub fn parent_dir(&self) -> Self {
        match self.inner.rfind('/') {
            Some(0) | None => Self::root(),
            Some(idx) => Self {
                inner: self.inner[..idx].to_string(),
            },
        }
    }

    /// Join this path with a child segment (or a relative sub-path).
    pub fn child(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Check whether this path lies below `other`.
    ///
    /// With `allow_equal` the path also counts as inside itself.
    pub fn inside(&self, other: &StoragePath, allow_equal: bool) -> bool {
        if self == other {
            return allow_equal;
        }
        if other.is_root() {
            return true;
        }
        self.inner.len() > other.inner.len()
            && self.inner.starts_with(&other.inner)
            && self.inner.as_bytes()[other.inner.len()] == b'/'
    }

    /// Relative form without the leading slash, empty for the root.
    pub fn relative(&self) -> &str {
        &self.inner[1..]
    }
}

impl Default for StoragePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl AsRef<str> for StoragePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for StoragePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StoragePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<StoragePath> for String {
    fn from(p: StoragePath) -> Self {
        p.inner
    }
}
