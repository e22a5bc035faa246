//! Shared test utilities for the notesync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`], a temporary on-disk storage
//! - [`seed`]: filling and inspecting any [`EntryStorage`]
//!
//! [`TestTree`]: tree::TestTree
//! [`EntryStorage`]: note_storage::EntryStorage

pub mod seed;
pub mod tree;

pub use seed::{Seed, dump, seed};
pub use tree::TestTree;
