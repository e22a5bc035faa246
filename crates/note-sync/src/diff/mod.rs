//! Diff classification for review
//!
//! Derives user-facing diff types from the synced/actual/remote triple of
//! each path and turns accept decisions into a concrete content source:
//! - **types**: diff types, accept actions and the classifier
//! - **entry**: diff entries, the accept policy and the staleness check
//! - **compute**: diffing the local tree against a remote outline

mod compute;
mod entry;
mod types;

pub use compute::{DiffDecisionMap, build_outline, compute_diff};
pub use entry::{
    SyncDiffEntry, is_accepted, is_accepted_state_lost, is_actionable,
    should_read_from_local_to_accept, walk_sync_diff_entries_down_to_top,
};
pub use types::{
    DiffAction, EntrySyncMetadata, SyncDiffType, classify, is_clean_local_diff,
    is_clean_remote_diff, is_conflicting_diff,
};
