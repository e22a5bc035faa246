//! Remote transport contract
//!
//! The core never encodes anything for the wire itself: an implementation
//! receives the typed snapshot and returns typed results. All data-model
//! types derive serde so any encoding preserving them will do.

use note_storage::StoragePath;

use crate::Result;
use crate::entry::{SyncEntry, SyncOutlineEntry};
use crate::result::SyncResult;

/// Connection to the remote side of a sync.
pub trait SyncTransport: Send + Sync {
    /// Stable identifier of the remote storage.
    fn id(&self) -> Result<String>;

    /// Send one snapshot and receive the per-path verdicts.
    fn sync(&self, snapshot: &SyncEntry) -> Result<Vec<SyncResult>>;

    /// Read-only view of the remote tree at `path`, `None` if it is absent.
    fn outline(&self, path: &StoragePath) -> Result<Option<SyncOutlineEntry>>;

    /// Remote bytes of a file.
    fn read(&self, path: &StoragePath) -> Result<Vec<u8>>;
}
