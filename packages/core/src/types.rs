use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's career profile. Exactly one exists per user once they have
/// authenticated; it is created at first sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub current_role: Option<String>,
    pub target_role: Option<String>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a user profile. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

/// A career goal set by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCreateInput {
    pub title: String,
    pub description: String,
    pub target_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

/// Partial update for an existing goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Difficulty levels for roadmaps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Beginner
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

/// External learning resource types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Video,
    Article,
    Course,
    Book,
    Practice,
}

/// An external learning resource attached to a roadmap step. Immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One unit of a roadmap. Steps keep a stable `order` index and id; after
/// creation only the completion flag is toggled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStep {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub resources: Vec<Resource>,
    pub estimated_time: String,
    pub order: u32,
}

/// An AI-generated learning plan for one skill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: String,
    pub title: String,
    pub description: String,
    pub skill: String,
    pub steps: Vec<RoadmapStep>,
    pub estimated_duration: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single question inside a mock interview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

/// A completed mock-interview session. Score, when present, is within
/// [0, 100]; degraded sessions are persisted with score 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MockInterview {
    pub id: String,
    pub role: String,
    pub questions: Vec<InterviewQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// The fixed taxonomy of activity kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    GoalCreated,
    GoalCompleted,
    RoadmapCreated,
    RoadmapStep,
    InterviewCompleted,
}

impl ActivityKind {
    /// Wire-format name of the kind, matching its serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::GoalCreated => "goal_created",
            ActivityKind::GoalCompleted => "goal_completed",
            ActivityKind::RoadmapCreated => "roadmap_created",
            ActivityKind::RoadmapStep => "roadmap_step",
            ActivityKind::InterviewCompleted => "interview_completed",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed metadata carried by an activity entry, one variant per entity kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum ActivityMetadata {
    Goal {
        #[serde(rename = "goalId")]
        goal_id: String,
    },
    Roadmap {
        #[serde(rename = "roadmapId")]
        roadmap_id: String,
        #[serde(rename = "stepId", skip_serializing_if = "Option::is_none")]
        step_id: Option<String>,
    },
    Interview {
        #[serde(rename = "interviewId")]
        interview_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<u8>,
    },
    None,
}

impl Default for ActivityMetadata {
    fn default() -> Self {
        ActivityMetadata::None
    }
}

/// One append-only entry in the activity log. Never mutated or deleted by
/// normal flow; statistics are derived solely from these entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub metadata: ActivityMetadata,
    pub created_at: DateTime<Utc>,
}

/// Notification severity/kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Info,
    Reminder,
}

/// A system-created notification; only the read flag is ever mutated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived dashboard metrics. Never persisted; recomputed on every read from
/// the entity collections and the activity log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub total_goals: u32,
    pub completed_goals: u32,
    pub active_roadmaps: u32,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub progress_percentage: u32,
    pub total_interviews: u32,
    pub avg_interview_score: u32,
    pub learning_streak: u32,
    pub weekly_hours: u32,
}
