//! Error types for note-sync

use note_storage::StoragePath;

/// Result type for note-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in note-sync operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote could not be reached or rejected the request
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Data was requested for an entry that cannot provide bytes
    #[error("Failed to provide data for entry: {path}")]
    MissingData { path: StoragePath },

    /// Remote asked for a local change without saying what to write
    #[error("No data provided by server for {path}")]
    MissingRemoteData { path: StoragePath },

    /// A result that needs an identity arrived without one
    #[error("Sync result for {path} carries no identity")]
    MissingIdentity { path: StoragePath },

    /// A configuration value is out of range
    #[error("Invalid sync config: {message}")]
    InvalidConfig { message: String },

    /// Metadata could not be read or persisted
    #[error("Metadata error: {message}")]
    Metadata { message: String },

    /// The content an accept decision was based on has changed since
    #[error("Accepted state is outdated for {path}, decide again")]
    AcceptedStateLost { path: StoragePath },

    /// No accept decision can be derived for the entry
    #[error("No accept decision recorded for {path}")]
    UndecidedAction { path: StoragePath },

    // Transparent wrappers for underlying crate errors
    /// Storage error from note-storage
    #[error(transparent)]
    Storage(#[from] note_storage::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
