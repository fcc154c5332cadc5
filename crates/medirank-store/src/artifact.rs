//! Local model-artifact store.
//!
//! Persists the fitted model between process restarts as a JSON blob.
//! The store is deliberately untyped about the blob's contents; a load
//! failure of any kind degrades to "no cached model" so a fresh fit
//! can proceed.

use std::path::{Path, PathBuf};

use medirank_common::{RecommendError, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

/// File-backed artifact store.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted at the platform data directory,
    /// e.g. `~/.local/share/medirank/model.json`.
    pub fn in_data_dir() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| RecommendError::Persistence("no platform data directory".to_string()))?;
        Ok(Self::new(base.join("medirank").join("model.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and write the artifact, creating parent directories.
    pub fn save<T: Serialize>(&self, artifact: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecommendError::Persistence(format!("{}: {e}", parent.display())))?;
        }
        let blob = serde_json::to_vec(artifact)?;
        std::fs::write(&self.path, blob)
            .map_err(|e| RecommendError::Persistence(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), "model artifact saved");
        Ok(())
    }

    /// Load the stored artifact. A missing, unreadable, or corrupt
    /// file is logged and treated as "no cached model".
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let blob = match std::fs::read(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read model artifact");
                return None;
            }
        };
        match serde_json::from_slice(&blob) {
            Ok(artifact) => {
                info!(path = %self.path.display(), "model artifact loaded");
                Some(artifact)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt model artifact ignored");
                None
            }
        }
    }

    /// Delete the stored artifact to force a retrain on next refresh.
    /// Returns whether a file was actually removed.
    pub fn reset(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "model artifact deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RecommendError::Persistence(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        fingerprint: String,
        n: u32,
    }

    fn store_in(dir: &tempfile::TempDir) -> ArtifactStore {
        ArtifactStore::new(dir.path().join("model.json"))
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let blob = Blob {
            fingerprint: "abc".to_string(),
            n: 7,
        };
        store.save(&blob).unwrap();
        let loaded: Blob = store.load().unwrap();
        assert_eq!(loaded, blob);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load::<Blob>().is_none());
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"not json").unwrap();
        assert!(store.load::<Blob>().is_none());
    }

    #[test]
    fn test_reset_deletes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Blob { fingerprint: "x".to_string(), n: 1 }).unwrap();
        assert!(store.reset().unwrap());
        assert!(!store.reset().unwrap());
        assert!(store.load::<Blob>().is_none());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested/deep/model.json"));
        store.save(&Blob { fingerprint: "y".to_string(), n: 2 }).unwrap();
        assert!(store.path().exists());
    }
}
