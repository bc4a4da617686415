// ABOUTME: Persistence layer for Ascent
// ABOUTME: Dual-backend storage (remote KV tree or local fallback store) behind one trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use ascent_core::{
    ActivityLogEntry, Goal, GoalUpdateInput, MockInterview, Notification, ProfileUpdateInput,
    Roadmap, UserProfile,
};

pub mod codec;
pub mod factory;
pub mod kv;
pub mod local;
pub mod remote;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("Storage quota exceeded")]
    QuotaExceeded,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Invalid stored data format")]
    InvalidFormat,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Connection settings for the remote persistence backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
}

impl RemoteConfig {
    /// Reads `ASCENT_BACKEND_URL` / `ASCENT_BACKEND_TOKEN`. Returns `None`
    /// when no backend URL is configured.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("ASCENT_BACKEND_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self {
            base_url,
            auth_token: env::var("ASCENT_BACKEND_TOKEN").ok(),
        })
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageProvider {
    /// Remote path-addressed backend, with the local store as the fallback
    /// when the availability probe fails at construction time
    Remote {
        config: RemoteConfig,
        fallback_path: PathBuf,
    },
    /// Local fallback store only
    Local {
        path: PathBuf,
        capacity_bytes: Option<usize>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Local {
                path: ascent_core::fallback_store_file(),
                capacity_bytes: None,
            },
        }
    }
}

impl StorageConfig {
    /// Remote when a backend URL is configured in the environment, local
    /// fallback otherwise
    pub fn from_env() -> Self {
        match RemoteConfig::from_env() {
            Some(config) => Self {
                provider: StorageProvider::Remote {
                    config,
                    fallback_path: ascent_core::fallback_store_file(),
                },
            },
            None => Self::default(),
        }
    }
}

/// Main storage trait both backends implement. Every operation is scoped to
/// one user; collections are ordered newest-created first.
#[async_trait]
pub trait UserDataStorage: Send + Sync {
    /// Short name for logging and storage info ("remote" or "local-fallback")
    fn provider_name(&self) -> &'static str;

    // Profile
    async fn get_profile(&self, uid: &str) -> StorageResult<Option<UserProfile>>;
    async fn put_profile(&self, uid: &str, profile: &UserProfile) -> StorageResult<()>;
    async fn update_profile(
        &self,
        uid: &str,
        patch: ProfileUpdateInput,
    ) -> StorageResult<UserProfile>;

    // Goals
    async fn create_goal(&self, uid: &str, goal: Goal) -> StorageResult<Goal>;
    async fn list_goals(&self, uid: &str) -> StorageResult<Vec<Goal>>;
    async fn update_goal(&self, uid: &str, id: &str, patch: GoalUpdateInput)
        -> StorageResult<Goal>;
    async fn delete_goal(&self, uid: &str, id: &str) -> StorageResult<()>;

    // Roadmaps
    async fn create_roadmap(&self, uid: &str, roadmap: Roadmap) -> StorageResult<Roadmap>;
    async fn list_roadmaps(&self, uid: &str) -> StorageResult<Vec<Roadmap>>;
    async fn update_roadmap_step(
        &self,
        uid: &str,
        roadmap_id: &str,
        step_id: &str,
        completed: bool,
    ) -> StorageResult<Roadmap>;
    async fn delete_roadmap(&self, uid: &str, id: &str) -> StorageResult<()>;

    // Mock interviews
    async fn save_interview(
        &self,
        uid: &str,
        interview: MockInterview,
    ) -> StorageResult<MockInterview>;
    async fn list_interviews(&self, uid: &str) -> StorageResult<Vec<MockInterview>>;
    async fn delete_interview(&self, uid: &str, id: &str) -> StorageResult<()>;

    // Activity log (append-only)
    async fn append_activity(
        &self,
        uid: &str,
        entry: ActivityLogEntry,
    ) -> StorageResult<ActivityLogEntry>;
    async fn list_activity(&self, uid: &str) -> StorageResult<Vec<ActivityLogEntry>>;

    // Notifications
    async fn create_notification(
        &self,
        uid: &str,
        notification: Notification,
    ) -> StorageResult<Notification>;
    async fn list_notifications(&self, uid: &str) -> StorageResult<Vec<Notification>>;
    async fn mark_notification_read(&self, uid: &str, id: &str) -> StorageResult<()>;
    async fn mark_all_notifications_read(&self, uid: &str) -> StorageResult<()>;
}

// Re-export the concrete pieces
pub use factory::{CollectionCounts, StorageFactory, StorageManager};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use local::LocalStorage;
pub use remote::{RemoteBackend, RemoteStorage};
