// ABOUTME: Core types, traits, and utilities for Ascent
// ABOUTME: Foundational package providing shared functionality across all Ascent packages

pub mod constants;
pub mod normalize;
pub mod record;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    ActivityKind, ActivityLogEntry, ActivityMetadata, DerivedStats, Difficulty, Goal,
    GoalCreateInput, GoalUpdateInput, InterviewQuestion, MockInterview, Notification,
    NotificationKind, ProfileUpdateInput, Resource, ResourceType, Roadmap, RoadmapStep,
    UserProfile,
};

// Re-export the record seam and the normalizer
pub use normalize::normalize;
pub use record::Record;

// Re-export constants
pub use constants::{ascent_dir, collection_key, fallback_store_file, KEY_PREFIX, STORE_VERSION};

// Re-export utilities
pub use utils::{generate_local_id, generate_step_id, path_exists};

// Re-export validation
pub use validation::{
    truncate, validate_goal_input, validate_interview, validate_profile_update, validate_roadmap,
    ValidationError,
};
