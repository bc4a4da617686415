// ABOUTME: Durable key-value substrate for the local fallback store
// ABOUTME: File-backed implementation with finite capacity plus an in-memory one for tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::{StorageError, StorageResult};

/// A durable string key-value store with enumerable keys and a finite
/// capacity. Keys enumerate in insertion order, oldest first; updating an
/// existing key keeps its position.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Fails with [`StorageError::QuotaExceeded`] when the write would push
    /// total stored bytes past capacity; the store is left unchanged.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    async fn remove_item(&self, key: &str) -> StorageResult<()>;

    async fn keys(&self) -> StorageResult<Vec<String>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KvEntry {
    key: String,
    value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: String,
    entries: Vec<KvEntry>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: ascent_core::STORE_VERSION.to_string(),
            entries: Vec::new(),
        }
    }
}

fn projected_size(entries: &[KvEntry], key: &str, value: &str) -> usize {
    entries
        .iter()
        .filter(|e| e.key != key)
        .map(|e| e.key.len() + e.value.len())
        .sum::<usize>()
        + key.len()
        + value.len()
}

fn apply_set(entries: &mut Vec<KvEntry>, key: &str, value: &str) {
    match entries.iter_mut().find(|e| e.key == key) {
        Some(entry) => entry.value = value.to_string(),
        None => entries.push(KvEntry {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// File-backed key-value store persisting a single JSON document under the
/// Ascent data directory. Writes go through a temp file and rename so a
/// crash never leaves a partial store on disk.
pub struct FileKvStore {
    path: PathBuf,
    capacity_bytes: Option<usize>,
    state: RwLock<StoreFile>,
}

impl FileKvStore {
    /// Opens the store at `path`, creating parent directories as needed. A
    /// missing file yields an empty store; an unreadable one is replaced
    /// with an empty store rather than failing startup.
    pub async fn open(path: PathBuf, capacity_bytes: Option<usize>) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let state = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<StoreFile>(&content) {
                Ok(file) => {
                    debug!("Loaded fallback store with {} entries", file.entries.len());
                    file
                }
                Err(e) => {
                    error!("Failed to parse fallback store file: {}", e);
                    warn!("Starting with an empty fallback store");
                    StoreFile::default()
                }
            },
            Err(_) => StoreFile::default(),
        };

        Ok(Self {
            path,
            capacity_bytes,
            state: RwLock::new(state),
        })
    }

    async fn persist(&self, state: &StoreFile) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(state)?;
        let temp = self.path.with_extension("tmp");
        fs::write(&temp, content).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;

        if let Some(capacity) = self.capacity_bytes {
            if projected_size(&state.entries, key, value) > capacity {
                return Err(StorageError::QuotaExceeded);
            }
        }

        apply_set(&mut state.entries, key, value);
        self.persist(&state).await
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|e| e.key != key);
        if state.entries.len() != before {
            self.persist(&state).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state.entries.iter().map(|e| e.key.clone()).collect())
    }
}

/// In-memory key-value store with the same capacity semantics; used by tests
/// to exercise quota handling without touching disk
pub struct MemoryKvStore {
    capacity_bytes: Option<usize>,
    entries: RwLock<Vec<KvEntry>>,
}

impl MemoryKvStore {
    pub fn new(capacity_bytes: Option<usize>) -> Self {
        Self {
            capacity_bytes,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        if let Some(capacity) = self.capacity_bytes {
            if projected_size(&entries, key, value) > capacity {
                return Err(StorageError::QuotaExceeded);
            }
        }
        apply_set(&mut entries, key, value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|e| e.key != key);
        Ok(())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|e| e.key.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_round_trips_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileKvStore::open(path.clone(), None).await.unwrap();
            store.set_item("ascent_u1_goals", "[]").await.unwrap();
            store.set_item("ascent_u1_roadmaps", "[1]").await.unwrap();
        }

        let reopened = FileKvStore::open(path, None).await.unwrap();
        assert_eq!(
            reopened.get_item("ascent_u1_goals").await.unwrap(),
            Some("[]".to_string())
        );
        assert_eq!(
            reopened.keys().await.unwrap(),
            vec!["ascent_u1_goals", "ascent_u1_roadmaps"]
        );
    }

    #[tokio::test]
    async fn keys_enumerate_in_insertion_order_and_update_keeps_position() {
        let store = MemoryKvStore::new(None);
        store.set_item("a", "1").await.unwrap();
        store.set_item("b", "2").await.unwrap();
        store.set_item("a", "updated").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.get_item("a").await.unwrap(), Some("updated".into()));
    }

    #[tokio::test]
    async fn set_item_over_capacity_fails_without_mutating() {
        let store = MemoryKvStore::new(Some(10));
        store.set_item("k", "12345").await.unwrap();

        let result = store.set_item("big", "0123456789").await;
        assert!(matches!(result, Err(StorageError::QuotaExceeded)));

        // previous contents untouched, oversized key absent
        assert_eq!(store.get_item("k").await.unwrap(), Some("12345".into()));
        assert_eq!(store.get_item("big").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileKvStore::open(path, None).await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }
}
