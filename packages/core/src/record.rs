use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{ActivityLogEntry, Goal, MockInterview, Notification, Roadmap};

/// A persisted, id-addressed item belonging to one of the per-user
/// collections. The backend stores records under
/// `users/{uid}/{COLLECTION}/{id}`; the local fallback store keys its
/// namespaces the same way.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection segment used in backend paths and local namespaces
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Creation timestamp used for the newest-first list ordering
    fn created_at(&self) -> DateTime<Utc>;
}

impl Record for Goal {
    const COLLECTION: &'static str = "goals";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Roadmap {
    const COLLECTION: &'static str = "roadmaps";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for MockInterview {
    const COLLECTION: &'static str = "interviews";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for ActivityLogEntry {
    const COLLECTION: &'static str = "activity";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Notification {
    const COLLECTION: &'static str = "notifications";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
