//! File-backed sync metadata persistence.

use std::fs;

use note_storage::StoragePath;
use note_sync::{
    ContentIdentity, Error, FileMetadataStore, SyncMetadataPatch, SyncMetadataStorage,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn patch(entries: &[(&str, Option<&str>)]) -> SyncMetadataPatch {
    entries
        .iter()
        .map(|(p, i)| (StoragePath::new(*p), i.map(ContentIdentity::new)))
        .collect()
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileMetadataStore::new(dir.path().join(".sync/metadata.json"));

    assert!(store.get().unwrap().is_empty());
}

#[test]
fn patches_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join(".sync/metadata.json");

    let store = FileMetadataStore::new(&file);
    store
        .set_multi(&patch(&[("/a.md", Some("sha256:a")), ("/b.md", Some("sha256:b"))]))
        .unwrap();
    store.set_multi(&patch(&[("/a.md", None)])).unwrap();

    let reopened = FileMetadataStore::new(&file);
    let map = reopened.get().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(
        map.get(&StoragePath::new("/b.md")),
        Some(&ContentIdentity::new("sha256:b"))
    );
}

#[test]
fn document_is_keyed_by_normalized_path() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metadata.json");
    let store = FileMetadataStore::new(&file);

    store
        .set_multi(&patch(&[("notes//a.md", Some("sha256:a"))]))
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "/notes/a.md": "sha256:a" }));
}

#[test]
fn empty_patch_does_not_create_the_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metadata.json");
    let store = FileMetadataStore::new(&file);

    store.set_multi(&SyncMetadataPatch::new()).unwrap();

    assert!(!file.exists());
}

#[test]
fn corrupt_document_is_a_metadata_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metadata.json");
    fs::write(&file, "{ not json").unwrap();

    let err = FileMetadataStore::new(&file).get().unwrap_err();

    assert!(matches!(err, Error::Metadata { .. }));
}
