//! Transport doubles and worker fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use note_storage::{MemoryStorage, StoragePath};
use note_sync::{
    ContentIdentity, Error, LocalSyncWorker, MemoryMetadataStore, Result, SyncEntry,
    SyncOutlineEntry, SyncResult, SyncTransport,
};

enum Reply {
    Results(Vec<SyncResult>),
    Fail(String),
}

/// Transport answering each round trip from a script.
///
/// Records every snapshot it receives. An exhausted script answers with no
/// results, meaning everything is in sync.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    snapshots: Mutex<Vec<SyncEntry>>,
    outline: Mutex<Option<SyncOutlineEntry>>,
    files: Mutex<BTreeMap<StoragePath, Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, results: Vec<SyncResult>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Results(results));
    }

    pub fn fail(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
    }

    pub fn set_outline(&self, outline: Option<SyncOutlineEntry>) {
        *self.outline.lock().unwrap() = outline;
    }

    pub fn set_file(&self, path: &str, content: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(StoragePath::new(path), content.to_vec());
    }

    pub fn snapshots(&self) -> Vec<SyncEntry> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn last_snapshot(&self) -> SyncEntry {
        self.snapshots
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no snapshot was sent")
    }
}

impl SyncTransport for ScriptedTransport {
    fn id(&self) -> Result<String> {
        Ok("scripted".to_string())
    }

    fn sync(&self, snapshot: &SyncEntry) -> Result<Vec<SyncResult>> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Results(results)) => Ok(results),
            Some(Reply::Fail(message)) => Err(Error::transport(message)),
            None => Ok(Vec::new()),
        }
    }

    fn outline(&self, _path: &StoragePath) -> Result<Option<SyncOutlineEntry>> {
        Ok(self.outline.lock().unwrap().clone())
    }

    fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::transport(format!("remote has no {path}")))
    }
}

/// A worker over in-memory storage and metadata.
pub struct Fixture {
    pub storage: Arc<MemoryStorage>,
    pub transport: Arc<ScriptedTransport>,
    pub metadata: Arc<MemoryMetadataStore>,
    pub worker: Arc<LocalSyncWorker>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_metadata(MemoryMetadataStore::new())
    }

    pub fn with_metadata(metadata: MemoryMetadataStore) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let transport = ScriptedTransport::new();
        let metadata = Arc::new(metadata);
        let worker = Arc::new(LocalSyncWorker::new(
            storage.clone(),
            transport.clone(),
            metadata.clone(),
        ));
        Self {
            storage,
            transport,
            metadata,
            worker,
        }
    }

    /// Queue `root` and run one full pass.
    pub fn sync(&self, root: &str) -> Result<()> {
        self.worker.add_root(StoragePath::new(root));
        self.worker.run_sync()
    }
}

pub fn id(value: &str) -> ContentIdentity {
    ContentIdentity::new(value)
}

pub fn path(value: &str) -> StoragePath {
    StoragePath::new(value)
}
