// ABOUTME: Storage factory and manager
// ABOUTME: Probes backend availability once at construction and selects the provider

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::kv::FileKvStore;
use crate::local::LocalStorage;
use crate::remote::{RemoteBackend, RemoteStorage};
use crate::{StorageConfig, StorageProvider, StorageResult, UserDataStorage};

/// Factory for creating storage instances
pub struct StorageFactory;

impl StorageFactory {
    /// Create a storage instance from configuration. With a remote provider
    /// configured, the backend is probed once here; an unavailable backend
    /// is not an error and selects the local fallback store instead.
    pub async fn create_storage(config: StorageConfig) -> StorageResult<Box<dyn UserDataStorage>> {
        debug!("Creating storage with provider: {:?}", config.provider);

        match config.provider {
            StorageProvider::Remote {
                config,
                fallback_path,
            } => {
                let backend = RemoteBackend::new(config);
                if backend.is_ready().await {
                    info!("Remote backend ready, using remote persistence");
                    Ok(Box::new(RemoteStorage::new(backend)))
                } else {
                    info!("Remote backend unavailable, using local fallback store");
                    Self::local(fallback_path, None).await
                }
            }
            StorageProvider::Local {
                path,
                capacity_bytes,
            } => {
                info!("Initializing local fallback store at: {:?}", path);
                Self::local(path, capacity_bytes).await
            }
        }
    }

    /// Create a storage instance from the environment
    pub async fn from_env() -> StorageResult<Box<dyn UserDataStorage>> {
        Self::create_storage(StorageConfig::from_env()).await
    }

    async fn local(
        path: PathBuf,
        capacity_bytes: Option<usize>,
    ) -> StorageResult<Box<dyn UserDataStorage>> {
        let kv = FileKvStore::open(path, capacity_bytes).await?;
        Ok(Box::new(LocalStorage::new(Arc::new(kv))))
    }
}

/// Holds the active storage instance selected at construction time; every
/// data-access call goes through this, so no per-call backend branching
/// exists anywhere above it
pub struct StorageManager {
    storage: Arc<Box<dyn UserDataStorage>>,
}

impl StorageManager {
    /// Create a new storage manager with the given configuration
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let storage = Arc::new(StorageFactory::create_storage(config).await?);
        Ok(Self { storage })
    }

    /// Create a storage manager from the environment
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(StorageConfig::from_env()).await
    }

    /// Wrap an already-constructed storage instance; lets tests inject fakes
    pub fn with_storage(storage: Box<dyn UserDataStorage>) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Get a reference to the storage instance
    pub fn storage(&self) -> Arc<Box<dyn UserDataStorage>> {
        self.storage.clone()
    }

    /// Name of the active provider ("remote" or "local-fallback")
    pub fn provider(&self) -> &'static str {
        self.storage.provider_name()
    }

    /// Per-collection record counts for one user
    pub async fn collection_counts(&self, uid: &str) -> StorageResult<CollectionCounts> {
        let storage = &self.storage;
        Ok(CollectionCounts {
            goals: storage.list_goals(uid).await?.len(),
            roadmaps: storage.list_roadmaps(uid).await?.len(),
            interviews: storage.list_interviews(uid).await?.len(),
            notifications: storage.list_notifications(uid).await?.len(),
            activity_entries: storage.list_activity(uid).await?.len(),
        })
    }
}

/// Record counts per collection, for storage reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCounts {
    pub goals: usize,
    pub roadmaps: usize,
    pub interviews: usize,
    pub notifications: usize,
    pub activity_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn unconfigured_remote_falls_back_to_local() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            provider: StorageProvider::Remote {
                config: RemoteConfig {
                    // nothing listens here; the probe must fail fast
                    base_url: "http://127.0.0.1:9".to_string(),
                    auth_token: None,
                },
                fallback_path: dir.path().join("store.json"),
            },
        };

        let manager = StorageManager::new(config).await.unwrap();
        assert_eq!(manager.provider(), "local-fallback");
    }

    #[tokio::test]
    async fn local_storage_counts_collections() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            provider: StorageProvider::Local {
                path: dir.path().join("store.json"),
                capacity_bytes: None,
            },
        };

        let manager = StorageManager::new(config).await.unwrap();
        let counts = manager.collection_counts("u1").await.unwrap();
        assert_eq!(
            counts,
            CollectionCounts {
                goals: 0,
                roadmaps: 0,
                interviews: 0,
                notifications: 0,
                activity_entries: 0,
            }
        );
    }
}
