//! Error types for note-storage

use std::path::PathBuf;

use crate::StoragePath;

/// Result type for note-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in note-storage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Entry does not exist: {path}")]
    NotExists { path: StoragePath },

    #[error("Not a directory: {path}")]
    NotDirectory { path: StoragePath },

    #[error("Is a directory: {path}")]
    IsDirectory { path: StoragePath },

    #[error("Entry already exists: {path}")]
    AlreadyExists { path: StoragePath },

    #[error("Cannot modify storage root")]
    RootModification,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the entry the operation addressed is missing.
    pub fn is_not_exists(&self) -> bool {
        matches!(self, Self::NotExists { .. })
    }

    /// True when the operation tried to create something that is already there.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
