// ABOUTME: Remote persistence backend client and storage adapter
// ABOUTME: Path-addressed get/set/update/remove/push over users/{uid}/{collection}/{id}

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use ascent_core::{
    normalize, ActivityLogEntry, Goal, GoalUpdateInput, MockInterview, Notification,
    ProfileUpdateInput, Record, Roadmap, UserProfile,
};

use crate::{RemoteConfig, StorageError, StorageResult, UserDataStorage};

/// Response shape of a push: the backend returns the generated child key
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Client for the path-addressed remote backend. Values crossing this
/// boundary carry ISO-8601 strings for every date field, never native date
/// objects.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RemoteBackend {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token,
        }
    }

    fn endpoint(&self, path: &str, extra_query: Option<&str>) -> String {
        let mut url = format!("{}/{}.json", self.base_url, path.trim_matches('/'));
        let mut params = Vec::new();
        if let Some(token) = &self.auth_token {
            params.push(format!("auth={}", token));
        }
        if let Some(extra) = extra_query {
            params.push(extra.to_string());
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    /// Capability probe: whether the backend is configured and reachable.
    /// Never errors; an unreachable backend just means fallback mode.
    pub async fn is_ready(&self) -> bool {
        if self.base_url.is_empty() {
            return false;
        }
        match self
            .client
            .get(self.endpoint("", Some("shallow=true")))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                info!("Remote backend unreachable: {}", e);
                false
            }
        }
    }

    pub async fn get(&self, path: &str) -> StorageResult<Option<Value>> {
        let response = self.client.get(self.endpoint(path, None)).send().await?;
        let value: Value = Self::check(response).await?.json().await?;
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }

    pub async fn set(&self, path: &str, value: &Value) -> StorageResult<()> {
        let response = self
            .client
            .put(self.endpoint(path, None))
            .json(value)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn update(&self, path: &str, patch: &Value) -> StorageResult<()> {
        let response = self
            .client
            .patch(self.endpoint(path, None))
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn remove(&self, path: &str) -> StorageResult<()> {
        let response = self.client.delete(self.endpoint(path, None)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Appends a child under `path`; the backend generates and returns its key
    pub async fn push(&self, path: &str, value: &Value) -> StorageResult<String> {
        let response = self
            .client
            .post(self.endpoint(path, None))
            .json(value)
            .send()
            .await?;
        let pushed: PushResponse = Self::check(response).await?.json().await?;
        Ok(pushed.name)
    }

    async fn check(response: reqwest::Response) -> StorageResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StorageError::Backend {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// [`UserDataStorage`] over the remote backend. Collections come back as
/// id-keyed maps and are normalized into ordered typed vecs on every read.
pub struct RemoteStorage {
    backend: RemoteBackend,
}

impl RemoteStorage {
    pub fn new(backend: RemoteBackend) -> Self {
        Self { backend }
    }

    fn collection_path(uid: &str, collection: &str) -> String {
        format!("users/{}/{}", uid, collection)
    }

    fn record_path(uid: &str, collection: &str, id: &str) -> String {
        format!("users/{}/{}/{}", uid, collection, id)
    }

    async fn list_records<T: Record>(&self, uid: &str) -> StorageResult<Vec<T>> {
        let path = Self::collection_path(uid, T::COLLECTION);
        match self.backend.get(&path).await? {
            Some(Value::Object(map)) => Ok(normalize(map)),
            Some(_) => Err(StorageError::InvalidFormat),
            None => Ok(Vec::new()),
        }
    }

    /// The stored record omits `id`: the backend key is the identity
    async fn create_record<T: Record>(&self, uid: &str, mut record: T) -> StorageResult<T> {
        let path = Self::collection_path(uid, T::COLLECTION);
        let value = strip_id(serde_json::to_value(&record)?);
        let id = self.backend.push(&path, &value).await?;
        debug!("Created {}/{} remotely", T::COLLECTION, id);
        record.set_id(id);
        Ok(record)
    }

    async fn get_record<T: Record>(&self, uid: &str, id: &str) -> StorageResult<Option<T>> {
        let path = Self::record_path(uid, T::COLLECTION, id);
        match self.backend.get(&path).await? {
            None => Ok(None),
            Some(mut value) => {
                if let Value::Object(fields) = &mut value {
                    fields.insert("id".to_string(), Value::String(id.to_string()));
                }
                Ok(serde_json::from_value(value).ok())
            }
        }
    }

    async fn require_record<T: Record>(&self, uid: &str, id: &str) -> StorageResult<T> {
        self.get_record(uid, id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", T::COLLECTION, id)))
    }

    async fn put_record<T: Record>(&self, uid: &str, record: &T) -> StorageResult<()> {
        let path = Self::record_path(uid, T::COLLECTION, record.id());
        let value = strip_id(serde_json::to_value(record)?);
        self.backend.set(&path, &value).await
    }
}

fn strip_id(mut value: Value) -> Value {
    if let Value::Object(fields) = &mut value {
        fields.remove("id");
    }
    value
}

#[async_trait]
impl UserDataStorage for RemoteStorage {
    fn provider_name(&self) -> &'static str {
        "remote"
    }

    async fn get_profile(&self, uid: &str) -> StorageResult<Option<UserProfile>> {
        let path = format!("users/{}/profile", uid);
        match self.backend.get(&path).await? {
            None => Ok(None),
            Some(value) => Ok(serde_json::from_value(value).ok()),
        }
    }

    async fn put_profile(&self, uid: &str, profile: &UserProfile) -> StorageResult<()> {
        let path = format!("users/{}/profile", uid);
        self.backend.set(&path, &serde_json::to_value(profile)?).await
    }

    async fn update_profile(
        &self,
        uid: &str,
        patch: ProfileUpdateInput,
    ) -> StorageResult<UserProfile> {
        let path = format!("users/{}/profile", uid);
        let mut overrides = serde_json::to_value(&patch)?;
        if let Value::Object(fields) = &mut overrides {
            fields.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        self.backend.update(&path, &overrides).await?;
        self.get_profile(uid)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("profile/{}", uid)))
    }

    async fn create_goal(&self, uid: &str, goal: Goal) -> StorageResult<Goal> {
        self.create_record(uid, goal).await
    }

    async fn list_goals(&self, uid: &str) -> StorageResult<Vec<Goal>> {
        self.list_records(uid).await
    }

    async fn update_goal(
        &self,
        uid: &str,
        id: &str,
        patch: GoalUpdateInput,
    ) -> StorageResult<Goal> {
        // Verify existence first so a patch never conjures a partial record
        let _: Goal = self.require_record(uid, id).await?;

        let path = Self::record_path(uid, Goal::COLLECTION, id);
        let mut overrides = serde_json::to_value(&patch)?;
        if let Value::Object(fields) = &mut overrides {
            fields.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        self.backend.update(&path, &overrides).await?;
        self.require_record(uid, id).await
    }

    async fn delete_goal(&self, uid: &str, id: &str) -> StorageResult<()> {
        self.backend
            .remove(&Self::record_path(uid, Goal::COLLECTION, id))
            .await
    }

    async fn create_roadmap(&self, uid: &str, roadmap: Roadmap) -> StorageResult<Roadmap> {
        self.create_record(uid, roadmap).await
    }

    async fn list_roadmaps(&self, uid: &str) -> StorageResult<Vec<Roadmap>> {
        self.list_records(uid).await
    }

    async fn update_roadmap_step(
        &self,
        uid: &str,
        roadmap_id: &str,
        step_id: &str,
        completed: bool,
    ) -> StorageResult<Roadmap> {
        let mut roadmap: Roadmap = self.require_record(uid, roadmap_id).await?;
        let step = roadmap
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or_else(|| {
                StorageError::NotFound(format!("roadmaps/{}/steps/{}", roadmap_id, step_id))
            })?;

        step.completed = completed;
        roadmap.updated_at = Utc::now();
        self.put_record(uid, &roadmap).await?;
        Ok(roadmap)
    }

    async fn delete_roadmap(&self, uid: &str, id: &str) -> StorageResult<()> {
        self.backend
            .remove(&Self::record_path(uid, Roadmap::COLLECTION, id))
            .await
    }

    async fn save_interview(
        &self,
        uid: &str,
        interview: MockInterview,
    ) -> StorageResult<MockInterview> {
        self.create_record(uid, interview).await
    }

    async fn list_interviews(&self, uid: &str) -> StorageResult<Vec<MockInterview>> {
        self.list_records(uid).await
    }

    async fn delete_interview(&self, uid: &str, id: &str) -> StorageResult<()> {
        self.backend
            .remove(&Self::record_path(uid, MockInterview::COLLECTION, id))
            .await
    }

    async fn append_activity(
        &self,
        uid: &str,
        entry: ActivityLogEntry,
    ) -> StorageResult<ActivityLogEntry> {
        self.create_record(uid, entry).await
    }

    async fn list_activity(&self, uid: &str) -> StorageResult<Vec<ActivityLogEntry>> {
        self.list_records(uid).await
    }

    async fn create_notification(
        &self,
        uid: &str,
        notification: Notification,
    ) -> StorageResult<Notification> {
        self.create_record(uid, notification).await
    }

    async fn list_notifications(&self, uid: &str) -> StorageResult<Vec<Notification>> {
        self.list_records(uid).await
    }

    async fn mark_notification_read(&self, uid: &str, id: &str) -> StorageResult<()> {
        let path = Self::record_path(uid, Notification::COLLECTION, id);
        self.backend
            .update(&path, &serde_json::json!({ "read": true }))
            .await
    }

    async fn mark_all_notifications_read(&self, uid: &str) -> StorageResult<()> {
        let notifications = self.list_notifications(uid).await?;
        for notification in notifications.iter().filter(|n| !n.read) {
            self.mark_notification_read(uid, notification.id()).await?;
        }
        Ok(())
    }
}
