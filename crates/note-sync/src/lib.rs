//! Local/remote tree reconciliation for notesync
//!
//! Detects changes on either side of a sync since the last confirmed state
//! and applies a bounded set of actions, surfacing genuine conflicts for
//! review instead of guessing.
//!
//! # Components
//!
//! - **identity**: content identities and how they are derived from storage
//! - **snapshot**: the [`SyncEntry`] tree sent to the remote per round trip
//! - **metadata**: the persisted path → last synced identity map
//! - **worker**: the pass loop applying remote verdicts locally
//! - **scheduler**: debounced and periodic triggering of passes
//! - **diff**: classification of differences and accept decisions
//!
//! Storage and transport are consumed through the [`EntryStorage`] and
//! [`SyncTransport`] traits.
//!
//! [`EntryStorage`]: note_storage::EntryStorage

pub mod config;
pub mod diff;
pub mod entry;
pub mod error;
pub mod identity;
pub mod logging;
pub mod metadata;
pub mod result;
pub mod scheduler;
pub mod snapshot;
pub mod transport;
pub mod walk;
pub mod worker;

pub use config::SyncConfig;
pub use diff::{DiffAction, EntrySyncMetadata, SyncDiffEntry, SyncDiffType};
pub use entry::{SyncEntry, SyncOutlineEntry};
pub use error::{Error, Result};
pub use identity::{ContentIdentity, identify};
pub use metadata::{
    FileMetadataStore, MemoryMetadataStore, SyncMetadataMap, SyncMetadataPatch,
    SyncMetadataStorage,
};
pub use result::{PendingConflict, SyncErrorRecord, SyncOutcome, SyncResult, SyncResultAction};
pub use scheduler::SyncScheduler;
pub use transport::SyncTransport;
pub use worker::{LocalSyncWorker, SyncStatus};
