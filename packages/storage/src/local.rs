// ABOUTME: Local fallback store used when the remote backend is unavailable
// ABOUTME: Namespaced per user and collection over a durable key-value substrate

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use ascent_core::{
    collection_key, generate_local_id, ActivityLogEntry, Goal, GoalUpdateInput, MockInterview,
    Notification, ProfileUpdateInput, Record, Roadmap, UserProfile, KEY_PREFIX,
};

use crate::codec::{decode_dates, encode_dates};
use crate::kv::KeyValueStore;
use crate::{StorageError, StorageResult, UserDataStorage};

const PROFILE_COLLECTION: &str = "profile";

/// Degraded-mode persistence over a durable key-value store. Collections are
/// kept newest-first (adds prepend); date fields survive the round trip via
/// the tag-and-restore codec.
pub struct LocalStorage {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStorage {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Replaces a user's whole collection. On quota exhaustion the oldest
    /// half of this system's keys is evicted and the write retried exactly
    /// once; a second failure propagates.
    pub async fn save<T: Record>(&self, uid: &str, items: &[T]) -> StorageResult<()> {
        let key = collection_key(uid, T::COLLECTION);
        let payload = self.encode_items(items)?;

        match self.kv.set_item(&key, &payload).await {
            Err(StorageError::QuotaExceeded) => {
                self.evict_oldest(&key).await?;
                self.kv.set_item(&key, &payload).await
            }
            other => other,
        }
    }

    /// Loads a user's collection; a missing collection is an empty vec
    pub async fn load<T: Record>(&self, uid: &str) -> StorageResult<Vec<T>> {
        let key = collection_key(uid, T::COLLECTION);
        match self.kv.get_item(&key).await? {
            None => Ok(Vec::new()),
            Some(payload) => {
                let values: Vec<Value> = serde_json::from_str(&payload)?;
                Ok(values
                    .into_iter()
                    .filter_map(|v| serde_json::from_value(decode_dates(v)).ok())
                    .collect())
            }
        }
    }

    /// Prepends an item; collections stay newest-first
    pub async fn add_item<T: Record>(&self, uid: &str, item: T) -> StorageResult<T> {
        let mut items = self.load::<T>(uid).await?;
        items.insert(0, item.clone());
        self.save(uid, &items).await?;
        Ok(item)
    }

    /// Merges `patch` (an object of field overrides) into the item with the
    /// given id and returns the updated item
    pub async fn update_item<T: Record>(
        &self,
        uid: &str,
        id: &str,
        patch: &Value,
    ) -> StorageResult<T> {
        let mut items = self.load::<T>(uid).await?;
        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", T::COLLECTION, id)))?;

        let mut value = serde_json::to_value(&items[index])?;
        if let (Value::Object(fields), Value::Object(overrides)) = (&mut value, patch) {
            for (k, v) in overrides {
                fields.insert(k.clone(), v.clone());
            }
        }
        let updated: T = serde_json::from_value(value)?;
        items[index] = updated.clone();
        self.save(uid, &items).await?;
        Ok(updated)
    }

    /// Removes the item with the given id, leaving all others untouched
    pub async fn delete_item<T: Record>(&self, uid: &str, id: &str) -> StorageResult<()> {
        let mut items = self.load::<T>(uid).await?;
        items.retain(|item| item.id() != id);
        self.save(uid, &items).await
    }

    fn encode_items<T: Record>(&self, items: &[T]) -> StorageResult<String> {
        let values: Vec<Value> = items
            .iter()
            .map(|item| serde_json::to_value(item).map(encode_dates))
            .collect::<Result<_, _>>()?;
        Ok(serde_json::to_string(&values)?)
    }

    async fn evict_oldest(&self, current_key: &str) -> StorageResult<()> {
        let keys: Vec<String> = self
            .kv
            .keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(KEY_PREFIX) && k != current_key)
            .collect();

        let evict_count = (keys.len() + 1) / 2;
        for key in keys.iter().take(evict_count) {
            self.kv.remove_item(key).await?;
        }
        warn!(
            "Storage quota exceeded, evicted {} oldest entries before retrying",
            evict_count
        );
        Ok(())
    }
}

#[async_trait]
impl UserDataStorage for LocalStorage {
    fn provider_name(&self) -> &'static str {
        "local-fallback"
    }

    async fn get_profile(&self, uid: &str) -> StorageResult<Option<UserProfile>> {
        let key = collection_key(uid, PROFILE_COLLECTION);
        match self.kv.get_item(&key).await? {
            None => Ok(None),
            Some(payload) => {
                let value: Value = serde_json::from_str(&payload)?;
                Ok(serde_json::from_value(decode_dates(value)).ok())
            }
        }
    }

    async fn put_profile(&self, uid: &str, profile: &UserProfile) -> StorageResult<()> {
        let key = collection_key(uid, PROFILE_COLLECTION);
        let encoded = encode_dates(serde_json::to_value(profile)?);
        let payload = serde_json::to_string(&encoded)?;
        match self.kv.set_item(&key, &payload).await {
            Err(StorageError::QuotaExceeded) => {
                self.evict_oldest(&key).await?;
                self.kv.set_item(&key, &payload).await
            }
            other => other,
        }
    }

    async fn update_profile(
        &self,
        uid: &str,
        patch: ProfileUpdateInput,
    ) -> StorageResult<UserProfile> {
        let mut profile = self
            .get_profile(uid)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("profile/{}", uid)))?;

        let mut value = serde_json::to_value(&profile)?;
        let overrides = serde_json::to_value(&patch)?;
        if let (Value::Object(fields), Value::Object(patch_fields)) = (&mut value, overrides) {
            for (k, v) in patch_fields {
                fields.insert(k, v);
            }
        }
        profile = serde_json::from_value(value)?;
        profile.updated_at = Utc::now();
        self.put_profile(uid, &profile).await?;
        Ok(profile)
    }

    async fn create_goal(&self, uid: &str, mut goal: Goal) -> StorageResult<Goal> {
        goal.set_id(generate_local_id());
        debug!("Creating goal {} locally", goal.id);
        self.add_item(uid, goal).await
    }

    async fn list_goals(&self, uid: &str) -> StorageResult<Vec<Goal>> {
        self.load(uid).await
    }

    async fn update_goal(
        &self,
        uid: &str,
        id: &str,
        patch: GoalUpdateInput,
    ) -> StorageResult<Goal> {
        let mut overrides = serde_json::to_value(&patch)?;
        if let Value::Object(fields) = &mut overrides {
            fields.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        self.update_item(uid, id, &overrides).await
    }

    async fn delete_goal(&self, uid: &str, id: &str) -> StorageResult<()> {
        self.delete_item::<Goal>(uid, id).await
    }

    async fn create_roadmap(&self, uid: &str, mut roadmap: Roadmap) -> StorageResult<Roadmap> {
        roadmap.set_id(generate_local_id());
        debug!("Creating roadmap {} locally", roadmap.id);
        self.add_item(uid, roadmap).await
    }

    async fn list_roadmaps(&self, uid: &str) -> StorageResult<Vec<Roadmap>> {
        self.load(uid).await
    }

    async fn update_roadmap_step(
        &self,
        uid: &str,
        roadmap_id: &str,
        step_id: &str,
        completed: bool,
    ) -> StorageResult<Roadmap> {
        let mut roadmaps = self.load::<Roadmap>(uid).await?;
        let roadmap = roadmaps
            .iter_mut()
            .find(|r| r.id == roadmap_id)
            .ok_or_else(|| StorageError::NotFound(format!("roadmaps/{}", roadmap_id)))?;
        let step = roadmap
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or_else(|| {
                StorageError::NotFound(format!("roadmaps/{}/steps/{}", roadmap_id, step_id))
            })?;

        step.completed = completed;
        roadmap.updated_at = Utc::now();
        let updated = roadmap.clone();
        self.save(uid, &roadmaps).await?;
        Ok(updated)
    }

    async fn delete_roadmap(&self, uid: &str, id: &str) -> StorageResult<()> {
        self.delete_item::<Roadmap>(uid, id).await
    }

    async fn save_interview(
        &self,
        uid: &str,
        mut interview: MockInterview,
    ) -> StorageResult<MockInterview> {
        interview.set_id(generate_local_id());
        debug!("Saving interview {} locally", interview.id);
        self.add_item(uid, interview).await
    }

    async fn list_interviews(&self, uid: &str) -> StorageResult<Vec<MockInterview>> {
        self.load(uid).await
    }

    async fn delete_interview(&self, uid: &str, id: &str) -> StorageResult<()> {
        self.delete_item::<MockInterview>(uid, id).await
    }

    async fn append_activity(
        &self,
        uid: &str,
        mut entry: ActivityLogEntry,
    ) -> StorageResult<ActivityLogEntry> {
        entry.set_id(generate_local_id());
        self.add_item(uid, entry).await
    }

    async fn list_activity(&self, uid: &str) -> StorageResult<Vec<ActivityLogEntry>> {
        self.load(uid).await
    }

    async fn create_notification(
        &self,
        uid: &str,
        mut notification: Notification,
    ) -> StorageResult<Notification> {
        notification.set_id(generate_local_id());
        self.add_item(uid, notification).await
    }

    async fn list_notifications(&self, uid: &str) -> StorageResult<Vec<Notification>> {
        self.load(uid).await
    }

    async fn mark_notification_read(&self, uid: &str, id: &str) -> StorageResult<()> {
        let patch = serde_json::json!({ "read": true });
        self.update_item::<Notification>(uid, id, &patch).await?;
        Ok(())
    }

    async fn mark_all_notifications_read(&self, uid: &str) -> StorageResult<()> {
        let mut notifications = self.load::<Notification>(uid).await?;
        for notification in &mut notifications {
            notification.read = true;
        }
        self.save(uid, &notifications).await
    }
}
