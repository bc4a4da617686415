// ABOUTME: Wire-format tests for the domain types
// ABOUTME: The remote backend sees camelCase keys and ISO-8601 strings for every date field

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use ascent_core::{
    ActivityKind, ActivityLogEntry, ActivityMetadata, DerivedStats, Difficulty, Goal,
    Notification, NotificationKind, ResourceType,
};

fn sample_date() -> DateTime<Utc> {
    "2025-06-01T10:00:00Z".parse().unwrap()
}

#[test]
fn goal_serializes_with_camel_case_and_iso_dates() {
    let goal = Goal {
        id: "g1".to_string(),
        title: "Learn Testing".to_string(),
        description: "desc".to_string(),
        target_date: Some(sample_date()),
        completed: false,
        category: Some("skill".to_string()),
        created_at: sample_date(),
        updated_at: sample_date(),
    };

    let value = serde_json::to_value(&goal).unwrap();
    assert_eq!(value["targetDate"], json!("2025-06-01T10:00:00Z"));
    assert_eq!(value["createdAt"], json!("2025-06-01T10:00:00Z"));
    assert!(value["targetDate"].is_string());
    assert!(value.get("target_date").is_none());
}

#[test]
fn goal_deserializes_without_optional_fields() {
    let goal: Goal = serde_json::from_value(json!({
        "id": "g1",
        "title": "t",
        "description": "d",
        "createdAt": "2025-06-01T10:00:00Z",
        "updatedAt": "2025-06-01T10:00:00Z",
    }))
    .unwrap();

    assert_eq!(goal.target_date, None);
    assert_eq!(goal.category, None);
    assert!(!goal.completed);
}

#[test]
fn activity_kind_uses_the_fixed_taxonomy_strings() {
    assert_eq!(
        serde_json::to_value(ActivityKind::GoalCompleted).unwrap(),
        json!("goal_completed")
    );
    assert_eq!(
        serde_json::to_value(ActivityKind::RoadmapStep).unwrap(),
        json!("roadmap_step")
    );
    let kind: ActivityKind = serde_json::from_value(json!("interview_completed")).unwrap();
    assert_eq!(kind, ActivityKind::InterviewCompleted);
}

#[test]
fn activity_metadata_is_tagged_by_entity() {
    let entry = ActivityLogEntry {
        id: "a1".to_string(),
        kind: ActivityKind::RoadmapStep,
        title: "t".to_string(),
        description: "d".to_string(),
        metadata: ActivityMetadata::Roadmap {
            roadmap_id: "r1".to_string(),
            step_id: Some("s1".to_string()),
        },
        created_at: sample_date(),
    };

    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["metadata"]["entity"], json!("roadmap"));
    assert_eq!(value["metadata"]["roadmapId"], json!("r1"));
    assert_eq!(value["metadata"]["stepId"], json!("s1"));

    let back: ActivityLogEntry = serde_json::from_value(value).unwrap();
    assert_eq!(back.metadata, entry.metadata);
}

#[test]
fn activity_entry_defaults_missing_metadata() {
    let entry: ActivityLogEntry = serde_json::from_value(json!({
        "id": "a1",
        "kind": "goal_created",
        "title": "t",
        "description": "d",
        "createdAt": "2025-06-01T10:00:00Z",
    }))
    .unwrap();

    assert_eq!(entry.metadata, ActivityMetadata::None);
}

#[test]
fn enums_use_lowercase_wire_names() {
    assert_eq!(
        serde_json::to_value(Difficulty::Intermediate).unwrap(),
        json!("intermediate")
    );
    assert_eq!(
        serde_json::to_value(ResourceType::Practice).unwrap(),
        json!("practice")
    );
    assert_eq!(
        serde_json::to_value(NotificationKind::Reminder).unwrap(),
        json!("reminder")
    );
}

#[test]
fn notification_read_flag_defaults_to_false() {
    let notification: Notification = serde_json::from_value(json!({
        "id": "n1",
        "kind": "info",
        "title": "t",
        "message": "m",
        "createdAt": "2025-06-01T10:00:00Z",
    }))
    .unwrap();

    assert!(!notification.read);
}

#[test]
fn derived_stats_serialize_camel_case() {
    let value = serde_json::to_value(DerivedStats::default()).unwrap();
    assert_eq!(value["progressPercentage"], json!(0));
    assert_eq!(value["avgInterviewScore"], json!(0));
    assert_eq!(value["learningStreak"], json!(0));
    assert_eq!(value["weeklyHours"], json!(0));
}
