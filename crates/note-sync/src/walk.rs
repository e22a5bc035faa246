//! Down-to-top traversal
//!
//! Wherever order matters (removals, metadata finalization) children must be
//! handled before the directories containing them. Items are grouped by path
//! depth and emitted deepest level first, preserving input order within a
//! level.

use std::collections::BTreeMap;

use note_storage::StoragePath;

/// Order `items` deepest-first using the path returned by `path_of`.
pub fn walk_down_to_top<T, F>(items: impl IntoIterator<Item = T>, path_of: F) -> Vec<T>
where
    F: Fn(&T) -> &StoragePath,
{
    let mut levels: BTreeMap<usize, Vec<T>> = BTreeMap::new();
    for item in items {
        let depth = path_of(&item).depth();
        levels.entry(depth).or_default().push(item);
    }

    levels.into_values().rev().flatten().collect()
}
