//! # Ascent Planner
//!
//! The data access layer of the Ascent dashboard: CRUD over a user's goals,
//! roadmaps, mock interviews, notifications and activity log, plus the
//! statistics aggregator that recomputes derived metrics on every read.

pub mod manager;
pub mod snapshot;
pub mod stats;

// Re-export main types from core
pub use ascent_core::{
    ActivityKind, ActivityLogEntry, ActivityMetadata, DerivedStats, Difficulty, Goal,
    GoalCreateInput, GoalUpdateInput, InterviewQuestion, MockInterview, Notification,
    NotificationKind, ProfileUpdateInput, Resource, ResourceType, Roadmap, RoadmapStep,
    UserProfile,
};

// Re-export manager surface
pub use manager::{ManagerError, ManagerResult, PlannerManager};

// Re-export the snapshot loader
pub use snapshot::UserData;

// Re-export the aggregator
pub use stats::{compute_stats, learning_streak, weekly_hours};

// Re-export storage configuration types
pub use ascent_storage::{
    RemoteConfig, StorageConfig, StorageError, StorageManager, StorageProvider, StorageResult,
    UserDataStorage,
};
