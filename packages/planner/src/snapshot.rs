// ABOUTME: Parallel user-data snapshot loader
// ABOUTME: The Rust rendition of the dashboard's data-fetching hook contract

use chrono::{DateTime, Local, Utc};

use ascent_core::{
    ActivityLogEntry, DerivedStats, Goal, MockInterview, Notification, Roadmap, UserProfile,
};

use crate::manager::PlannerManager;
use crate::stats::compute_stats;

/// One consistent-per-collection snapshot of everything the dashboard
/// renders. Collections are loaded concurrently; each individually reflects
/// its state at call time, with no cross-collection ordering guarantee.
#[derive(Debug, Clone)]
pub struct UserData {
    pub profile: Option<UserProfile>,
    pub goals: Vec<Goal>,
    pub roadmaps: Vec<Roadmap>,
    pub interviews: Vec<MockInterview>,
    pub activity: Vec<ActivityLogEntry>,
    pub notifications: Vec<Notification>,
    pub stats: DerivedStats,
    pub loaded_at: DateTime<Utc>,
}

impl UserData {
    /// Loads all collections for one user in parallel. Reads degrade to
    /// empty collections, so this never fails.
    pub async fn load(manager: &PlannerManager, uid: &str) -> Self {
        let (profile, goals, roadmaps, interviews, activity, notifications) = tokio::join!(
            manager.get_user_profile(uid),
            manager.list_goals(uid),
            manager.list_roadmaps(uid),
            manager.list_mock_interviews(uid),
            manager.list_activities(uid),
            manager.list_notifications(uid),
        );

        // Stats come from the same snapshot the dashboard will render
        let stats = compute_stats(
            &goals,
            &roadmaps,
            &interviews,
            &activity,
            Local::now().date_naive(),
        );

        Self {
            profile,
            goals,
            roadmaps,
            interviews,
            activity,
            notifications,
            stats,
            loaded_at: Utc::now(),
        }
    }

    /// Manual refresh trigger: reloads everything in place
    pub async fn refresh(&mut self, manager: &PlannerManager, uid: &str) {
        *self = Self::load(manager, uid).await;
    }
}
