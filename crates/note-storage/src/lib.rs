//! Storage abstraction for notesync
//!
//! Provides normalized storage paths, the [`EntryStorage`] contract consumed by
//! the sync core, two reference storages (in-memory and filesystem-backed),
//! atomic I/O and format-agnostic configuration loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod fs;
pub mod io;
pub mod memory;
pub mod path;
pub mod storage;

pub use config::ConfigStore;
pub use constants::SpecialPath;
pub use error::{Error, Result};
pub use fs::FsStorage;
pub use memory::MemoryStorage;
pub use path::StoragePath;
pub use storage::{EntryStats, EntryStorage, StorageEntryPointer};
