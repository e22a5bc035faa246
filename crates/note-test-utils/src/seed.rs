//! Filling and inspecting storages in tests.

use std::collections::BTreeMap;

use note_storage::{EntryStorage, StoragePath};

/// One entry to create: a directory or a file with its content.
#[derive(Debug, Clone, Copy)]
pub enum Seed<'a> {
    Dir(&'a str),
    File(&'a str, &'a str),
}

/// Create every seed entry in order, parents first.
///
/// # Panics
/// Panics if the storage rejects an entry.
pub fn seed(storage: &dyn EntryStorage, entries: &[Seed<'_>]) {
    for entry in entries {
        match *entry {
            Seed::Dir(path) => storage
                .create_dir(&StoragePath::new(path))
                .unwrap_or_else(|e| panic!("seed: failed to create {path}: {e}")),
            Seed::File(path, content) => storage
                .write_or_create(&StoragePath::new(path), content.as_bytes())
                .unwrap_or_else(|e| panic!("seed: failed to write {path}: {e}")),
        }
    }
}

/// Every path below the root mapped to its text, `None` for directories.
///
/// # Panics
/// Panics if the storage cannot be listed or read.
pub fn dump(storage: &dyn EntryStorage) -> BTreeMap<String, Option<String>> {
    let mut out = BTreeMap::new();
    collect(storage, &StoragePath::root(), &mut out);
    out
}

fn collect(
    storage: &dyn EntryStorage,
    path: &StoragePath,
    out: &mut BTreeMap<String, Option<String>>,
) {
    let children = storage
        .children(path)
        .unwrap_or_else(|e| panic!("dump: failed to list {path}: {e}"));
    for child in children {
        let stats = storage.stats(&child).unwrap();
        if stats.is_directory {
            out.insert(child.to_string(), None);
            collect(storage, &child, out);
        } else {
            let bytes = storage.read(&child).unwrap();
            out.insert(
                child.to_string(),
                Some(String::from_utf8_lossy(&bytes).into_owned()),
            );
        }
    }
}
