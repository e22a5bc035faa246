//! Transport-level tree records
//!
//! [`SyncEntry`] describes local state relative to the last sync and is what
//! a snapshot sends to the remote. [`SyncOutlineEntry`] is the read-only view
//! of a tree the remote hands back for diff review.

use note_storage::{EntryStats, StoragePath};
use serde::{Deserialize, Serialize};

use crate::identity::ContentIdentity;
use crate::walk::walk_down_to_top;

/// One path's record in a sync snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntry {
    pub path: StoragePath,

    /// Identity at the time it was last synced.
    /// `None` means there is no sync record for the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<ContentIdentity>,

    /// Identity now. `None` means the path does not exist locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ContentIdentity>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyncEntry>,

    /// Bytes, attached only after the remote asked for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,

    /// Forcibly resolve a known conflict in favor of this side.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_conflict_resolve: bool,

    /// Remote identity the forced resolution was decided against. The remote
    /// honors the resolution only while its identity still matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_identity: Option<ContentIdentity>,
}

impl SyncEntry {
    pub fn new(path: StoragePath) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// This entry and all descendants, depth-first, children before parents.
    pub fn flatten(&self) -> Vec<&SyncEntry> {
        let mut out = Vec::new();
        collect_post_order(self, &mut out);
        out
    }

    /// All entries grouped by depth, deepest level first.
    pub fn walk_down_to_top(&self) -> Vec<&SyncEntry> {
        walk_down_to_top(self.flatten(), |entry| &entry.path)
    }

    /// Find the entry for `path` in this tree.
    pub fn find(&self, path: &StoragePath) -> Option<&SyncEntry> {
        if &self.path == path {
            return Some(self);
        }
        if !path.inside(&self.path, false) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

fn collect_post_order<'a>(entry: &'a SyncEntry, out: &mut Vec<&'a SyncEntry>) {
    for child in &entry.children {
        collect_post_order(child, out);
    }
    out.push(entry);
}

/// Remote view of one entry, as returned by an outline request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutlineEntry {
    pub name: String,
    pub identity: ContentIdentity,
    pub stats: EntryStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyncOutlineEntry>,
}

impl SyncOutlineEntry {
    /// Flatten the outline rooted at `path` into (path, identity) pairs.
    pub fn identities(&self, path: &StoragePath) -> Vec<(StoragePath, ContentIdentity)> {
        let mut out = vec![(path.clone(), self.identity.clone())];
        for child in &self.children {
            out.extend(child.identities(&path.child(&child.name)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SyncEntry {
        let mut root = SyncEntry::new(StoragePath::root());
        let mut dir = SyncEntry::new(StoragePath::new("/dir"));
        dir.children.push(SyncEntry::new(StoragePath::new("/dir/a.md")));
        root.children.push(dir);
        root.children.push(SyncEntry::new(StoragePath::new("/b.md")));
        root
    }

    #[test]
    fn flatten_puts_children_before_parents() {
        let root = tree();
        let paths: Vec<&str> = root.flatten().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/dir/a.md", "/dir", "/b.md", "/"]);
    }

    #[test]
    fn find_descends_only_into_matching_subtrees() {
        let root = tree();
        assert!(root.find(&StoragePath::new("/dir/a.md")).is_some());
        assert!(root.find(&StoragePath::new("/dir/missing.md")).is_none());
    }

    fn node(path: &str, children: Vec<SyncEntry>) -> SyncEntry {
        SyncEntry {
            children,
            ..SyncEntry::new(StoragePath::new(path))
        }
    }

    #[test]
    fn walk_emits_every_level_before_its_parents() {
        let root = node(
            "/",
            vec![
                node(
                    "/a",
                    vec![
                        node("/a/x", vec![node("/a/x/1.md", vec![]), node("/a/x/2.md", vec![])]),
                        node("/a/y", vec![node("/a/y/3.md", vec![])]),
                    ],
                ),
                node("/b", vec![node("/b/z", vec![node("/b/z/4.md", vec![])])]),
                node("/c.md", vec![]),
            ],
        );

        let depths: Vec<usize> = root
            .walk_down_to_top()
            .iter()
            .map(|e| e.path.depth())
            .collect();

        assert_eq!(depths.len(), 11);
        assert!(depths.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(depths.iter().filter(|d| **d == 3).count(), 4);
        assert_eq!(depths.iter().filter(|d| **d == 2).count(), 3);
        assert_eq!(depths.iter().filter(|d| **d == 1).count(), 3);
        assert_eq!(depths.last(), Some(&0));
    }

    #[test]
    fn empty_fields_are_omitted_on_the_wire() {
        let json = serde_json::to_value(SyncEntry::new(StoragePath::new("/x"))).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "/x" }));
    }
}
