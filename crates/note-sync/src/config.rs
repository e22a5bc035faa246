//! Sync configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use note_storage::{ConfigStore, SpecialPath};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables for a sync worker and its scheduler.
///
/// Loaded from `.toml`, `.json` or `.yaml`; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after the last trigger before a pass starts
    pub debounce_ms: u64,
    /// Interval of the forced periodic trigger
    pub tick_interval_ms: u64,
    /// Metadata file, relative to the storage root
    pub metadata_file: PathBuf,
    /// Entry names never listed by the filesystem storage
    pub ignored: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 5000,
            tick_interval_ms: 10000,
            metadata_file: PathBuf::from(".sync/metadata.json"),
            ignored: vec![
                SpecialPath::Git.as_str().to_string(),
                SpecialPath::SyncDir.as_str().to_string(),
            ],
        }
    }
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = ConfigStore::new().load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig {
                message: "tick_interval_ms must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Metadata file location under a storage root.
    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        root.join(&self.metadata_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_worker_timing() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce(), Duration::from_secs(5));
        assert_eq!(config.tick_interval(), Duration::from_secs(10));
        assert_eq!(config.ignored, vec![".git", ".sync"]);
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sync.json");
        std::fs::write(&file, r#"{ "debounce_ms": 10, "tick_interval_ms": 0 }"#).unwrap();

        let err = SyncConfig::load(&file).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(SyncConfig::load_or_default(&file).is_err());
    }

    #[test]
    fn zero_debounce_is_accepted() {
        let config = SyncConfig {
            debounce_ms: 0,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_or_default_falls_back_only_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sync.yaml");
        assert_eq!(SyncConfig::load_or_default(&file).unwrap(), SyncConfig::default());

        std::fs::write(&file, "tick_interval_ms: 250\n").unwrap();
        let config = SyncConfig::load_or_default(&file).unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.debounce_ms, 5000);
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{ "debounce_ms": 250 }"#).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.tick_interval_ms, 10000);
    }
}
