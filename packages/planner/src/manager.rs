// ABOUTME: Data access layer for the dashboard
// ABOUTME: Backend-agnostic CRUD with activity side-effects and degrade-on-read semantics

use chrono::{Local, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use ascent_auth::AuthUser;
use ascent_core::{
    truncate, validate_goal_input, validate_interview, validate_profile_update, validate_roadmap,
    ActivityKind, ActivityLogEntry, ActivityMetadata, DerivedStats, Goal, GoalCreateInput,
    GoalUpdateInput, MockInterview, Notification, NotificationKind, ProfileUpdateInput, Roadmap,
    UserProfile, ValidationError,
};
use ascent_storage::{StorageConfig, StorageError, StorageManager};

use crate::stats::compute_stats;

/// Manager errors
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Validation errors: {0:?}")]
    Validation(Vec<ValidationError>),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

fn reject_invalid(errors: Vec<ValidationError>) -> ManagerResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ManagerError::Validation(errors))
    }
}

/// The data access layer. Holds the storage manager selected once at
/// construction; every method is backend-agnostic from here down.
///
/// Write operations (`create`/`update`/`delete`) log and propagate failures
/// so the caller can surface a retry. Read operations (`list_*`,
/// `get_stats`) degrade to empty results instead: the dashboard must always
/// render.
pub struct PlannerManager {
    storage: Arc<StorageManager>,
}

impl PlannerManager {
    pub async fn new(config: StorageConfig) -> ManagerResult<Self> {
        let storage = Arc::new(StorageManager::new(config).await?);
        info!(
            "Planner manager initialized with {} storage",
            storage.provider()
        );
        Ok(Self { storage })
    }

    pub fn with_storage(storage: Arc<StorageManager>) -> Self {
        Self { storage }
    }

    // ---- Profile ----

    /// Creates the profile at first sign-in; later calls return the stored
    /// profile untouched
    pub async fn ensure_profile(&self, user: &AuthUser) -> ManagerResult<UserProfile> {
        let storage = self.storage.storage();
        if let Some(existing) = storage.get_profile(&user.uid).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let profile = UserProfile {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            current_role: None,
            target_role: None,
            experience_level: None,
            location: None,
            bio: None,
            skills: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        storage.put_profile(&user.uid, &profile).await?;
        info!("Created profile for {}", user.uid);
        Ok(profile)
    }

    pub async fn get_user_profile(&self, uid: &str) -> Option<UserProfile> {
        match self.storage.storage().get_profile(uid).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Failed to load profile for {}: {}", uid, e);
                None
            }
        }
    }

    pub async fn update_user_profile(
        &self,
        uid: &str,
        patch: ProfileUpdateInput,
    ) -> ManagerResult<UserProfile> {
        reject_invalid(validate_profile_update(&patch))?;
        let profile = self.storage.storage().update_profile(uid, patch).await?;
        info!("Updated profile for {}", uid);
        Ok(profile)
    }

    // ---- Goals ----

    pub async fn create_goal(&self, uid: &str, input: GoalCreateInput) -> ManagerResult<Goal> {
        reject_invalid(validate_goal_input(&input))?;

        let now = Utc::now();
        let goal = Goal {
            id: String::new(),
            title: input.title,
            description: input.description,
            target_date: input.target_date,
            completed: false,
            category: input.category,
            created_at: now,
            updated_at: now,
        };

        let goal = self.storage.storage().create_goal(uid, goal).await?;
        info!("Created goal '{}' with ID {}", goal.title, goal.id);

        self.record_activity(
            uid,
            ActivityKind::GoalCreated,
            "Set a new goal",
            &goal.title,
            ActivityMetadata::Goal {
                goal_id: goal.id.clone(),
            },
        )
        .await;

        Ok(goal)
    }

    pub async fn list_goals(&self, uid: &str) -> Vec<Goal> {
        self.degrade(self.storage.storage().list_goals(uid).await, "goals")
    }

    pub async fn update_goal(
        &self,
        uid: &str,
        id: &str,
        patch: GoalUpdateInput,
    ) -> ManagerResult<Goal> {
        let completing = patch.completed == Some(true);
        let goal = self.storage.storage().update_goal(uid, id, patch).await?;
        info!("Updated goal '{}' (ID: {})", goal.title, goal.id);

        if completing {
            self.record_activity(
                uid,
                ActivityKind::GoalCompleted,
                "Completed a goal",
                &goal.title,
                ActivityMetadata::Goal {
                    goal_id: goal.id.clone(),
                },
            )
            .await;
            self.notify(
                uid,
                NotificationKind::Success,
                "Goal completed",
                &format!("You completed \"{}\".", truncate(&goal.title, 80)),
            )
            .await;
        }

        Ok(goal)
    }

    pub async fn delete_goal(&self, uid: &str, id: &str) -> ManagerResult<()> {
        self.storage.storage().delete_goal(uid, id).await?;
        info!("Deleted goal {}", id);
        Ok(())
    }

    // ---- Roadmaps ----

    pub async fn create_roadmap(&self, uid: &str, roadmap: Roadmap) -> ManagerResult<Roadmap> {
        reject_invalid(validate_roadmap(&roadmap))?;

        let roadmap = self.storage.storage().create_roadmap(uid, roadmap).await?;
        info!("Created roadmap '{}' with ID {}", roadmap.title, roadmap.id);

        self.record_activity(
            uid,
            ActivityKind::RoadmapCreated,
            "Started a new roadmap",
            &roadmap.title,
            ActivityMetadata::Roadmap {
                roadmap_id: roadmap.id.clone(),
                step_id: None,
            },
        )
        .await;
        self.notify(
            uid,
            NotificationKind::Success,
            "Roadmap ready",
            &format!("Your \"{}\" roadmap is ready.", truncate(&roadmap.title, 80)),
        )
        .await;

        Ok(roadmap)
    }

    pub async fn list_roadmaps(&self, uid: &str) -> Vec<Roadmap> {
        self.degrade(self.storage.storage().list_roadmaps(uid).await, "roadmaps")
    }

    pub async fn update_roadmap_step(
        &self,
        uid: &str,
        roadmap_id: &str,
        step_id: &str,
        completed: bool,
    ) -> ManagerResult<Roadmap> {
        let roadmap = self
            .storage
            .storage()
            .update_roadmap_step(uid, roadmap_id, step_id, completed)
            .await?;

        if completed {
            let step_title = roadmap
                .steps
                .iter()
                .find(|s| s.id == step_id)
                .map(|s| s.title.clone())
                .unwrap_or_default();
            self.record_activity(
                uid,
                ActivityKind::RoadmapStep,
                "Completed a roadmap step",
                &step_title,
                ActivityMetadata::Roadmap {
                    roadmap_id: roadmap_id.to_string(),
                    step_id: Some(step_id.to_string()),
                },
            )
            .await;
        }

        Ok(roadmap)
    }

    pub async fn delete_roadmap(&self, uid: &str, id: &str) -> ManagerResult<()> {
        self.storage.storage().delete_roadmap(uid, id).await?;
        info!("Deleted roadmap {}", id);
        Ok(())
    }

    // ---- Mock interviews ----

    /// Persists a finished interview session. If the save fails, a degraded
    /// record (score 0, explanatory feedback) is attempted once so the
    /// user's answers are not lost; a second failure propagates.
    pub async fn save_mock_interview(
        &self,
        uid: &str,
        interview: MockInterview,
    ) -> ManagerResult<MockInterview> {
        reject_invalid(validate_interview(&interview))?;

        let storage = self.storage.storage();
        let saved = match storage.save_interview(uid, interview.clone()).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(
                    "Failed to save evaluated interview, retrying with degraded record: {}",
                    e
                );
                let mut degraded = interview;
                degraded.score = Some(0);
                degraded.feedback = Some(
                    "Your answers were saved, but the evaluation could not be stored."
                        .to_string(),
                );
                storage.save_interview(uid, degraded).await?
            }
        };

        info!("Saved interview for role '{}' (ID: {})", saved.role, saved.id);
        self.record_activity(
            uid,
            ActivityKind::InterviewCompleted,
            "Completed a mock interview",
            &saved.role,
            ActivityMetadata::Interview {
                interview_id: saved.id.clone(),
                score: saved.score,
            },
        )
        .await;

        Ok(saved)
    }

    pub async fn list_mock_interviews(&self, uid: &str) -> Vec<MockInterview> {
        self.degrade(
            self.storage.storage().list_interviews(uid).await,
            "interviews",
        )
    }

    pub async fn delete_mock_interview(&self, uid: &str, id: &str) -> ManagerResult<()> {
        self.storage.storage().delete_interview(uid, id).await?;
        info!("Deleted interview {}", id);
        Ok(())
    }

    // ---- Activity log ----

    pub async fn log_activity(
        &self,
        uid: &str,
        kind: ActivityKind,
        title: &str,
        description: &str,
        metadata: ActivityMetadata,
    ) -> ManagerResult<ActivityLogEntry> {
        let entry = ActivityLogEntry {
            id: String::new(),
            kind,
            title: title.to_string(),
            description: description.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        Ok(self.storage.storage().append_activity(uid, entry).await?)
    }

    pub async fn list_activities(&self, uid: &str) -> Vec<ActivityLogEntry> {
        self.degrade(self.storage.storage().list_activity(uid).await, "activity")
    }

    // ---- Notifications ----

    pub async fn create_notification(
        &self,
        uid: &str,
        kind: NotificationKind,
        title: &str,
        message: &str,
        action_url: Option<String>,
    ) -> ManagerResult<Notification> {
        let notification = Notification {
            id: String::new(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            read: false,
            action_url,
            created_at: Utc::now(),
        };
        Ok(self
            .storage
            .storage()
            .create_notification(uid, notification)
            .await?)
    }

    pub async fn list_notifications(&self, uid: &str) -> Vec<Notification> {
        self.degrade(
            self.storage.storage().list_notifications(uid).await,
            "notifications",
        )
    }

    pub async fn mark_notification_read(&self, uid: &str, id: &str) -> ManagerResult<()> {
        Ok(self
            .storage
            .storage()
            .mark_notification_read(uid, id)
            .await?)
    }

    pub async fn mark_all_notifications_read(&self, uid: &str) -> ManagerResult<()> {
        Ok(self
            .storage
            .storage()
            .mark_all_notifications_read(uid)
            .await?)
    }

    // ---- Stats ----

    /// Recomputes derived metrics from whatever currently exists. Never
    /// fails; unreadable collections contribute empty data.
    pub async fn get_stats(&self, uid: &str) -> DerivedStats {
        let storage = self.storage.storage();
        let (goals, roadmaps, interviews, activity) = tokio::join!(
            storage.list_goals(uid),
            storage.list_roadmaps(uid),
            storage.list_interviews(uid),
            storage.list_activity(uid),
        );

        compute_stats(
            &self.degrade(goals, "goals"),
            &self.degrade(roadmaps, "roadmaps"),
            &self.degrade(interviews, "interviews"),
            &self.degrade(activity, "activity"),
            Local::now().date_naive(),
        )
    }

    // ---- Internals ----

    fn degrade<T>(&self, result: Result<Vec<T>, StorageError>, what: &str) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to load {}: {}", what, e);
                Vec::new()
            }
        }
    }

    /// Best-effort activity append: a failure here must never fail the
    /// primary write, but it always leaves a trace in the log output
    async fn record_activity(
        &self,
        uid: &str,
        kind: ActivityKind,
        title: &str,
        description: &str,
        metadata: ActivityMetadata,
    ) {
        if let Err(e) = self
            .log_activity(uid, kind, title, description, metadata)
            .await
        {
            warn!("Failed to record {} activity: {}", kind, e);
        }
    }

    /// Best-effort notification fan-out
    async fn notify(&self, uid: &str, kind: NotificationKind, title: &str, message: &str) {
        if let Err(e) = self
            .create_notification(uid, kind, title, message, None)
            .await
        {
            warn!("Failed to create notification '{}': {}", title, e);
        }
    }
}
