//! services/api/src/adapters/kv.rs
//!
//! The key-value contract the catalog is persisted through, with a file-backed
//! implementation for the running service and an in-memory one for tests and
//! throwaway sessions.

use async_trait::async_trait;
use library_catalog_core::ports::{PortError, PortResult};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// A string store addressed by a fixed key per collection.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing was ever stored under `key`.
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> PortResult<()>;
}

//=========================================================================================
// In-Memory Store
//=========================================================================================

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

//=========================================================================================
// File Store
//=========================================================================================

/// Keeps each key in `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// crash mid-write leaves the previous blob in place.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Creates a new `FileKvStore`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PortResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PortError::Unexpected(format!("invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                debug!(path = %path.display(), bytes = contents.len(), "Read store file");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            PortError::Unexpected(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            PortError::Unexpected(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = value.len(), "Wrote store file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("catalog-kv-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("catalog").await.unwrap(), None);
        store.set("catalog", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("catalog").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn file_store_creates_directory_and_overwrites() {
        let dir = scratch_dir();
        let store = FileKvStore::new(&dir);
        assert_eq!(store.get("activity-log").await.unwrap(), None);

        store.set("activity-log", "[1]".to_string()).await.unwrap();
        store.set("activity-log", "[1,2]".to_string()).await.unwrap();
        assert_eq!(store.get("activity-log").await.unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.join("activity-log.json").exists());
        assert!(!dir.join("activity-log.json.tmp").exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let store = FileKvStore::new(scratch_dir());
        assert!(store.get("../etc/passwd").await.is_err());
        assert!(store.set("", String::new()).await.is_err());
    }
}
