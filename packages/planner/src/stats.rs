// ABOUTME: Statistics aggregator for the dashboard
// ABOUTME: Pure recomputation from entity collections and the activity log, no I/O and no stored counters

use chrono::{DateTime, Local, NaiveDate};
use std::collections::HashSet;

use ascent_core::{ActivityKind, ActivityLogEntry, DerivedStats, Goal, MockInterview, Roadmap};

/// Estimated hours credited per activity kind in the weekly-hours heuristic.
/// These are documented placeholder constants, not measured durations.
const STEP_HOURS: f64 = 2.0;
const GOAL_HOURS: f64 = 1.0;
const INTERVIEW_HOURS: f64 = 0.5;
const OTHER_HOURS: f64 = 0.25;

/// Computes every derived metric from raw collections. `today` is the local
/// calendar date the streak and weekly window anchor on; callers pass
/// `Local::now().date_naive()` in production and fixed dates in tests.
pub fn compute_stats(
    goals: &[Goal],
    roadmaps: &[Roadmap],
    interviews: &[MockInterview],
    activity: &[ActivityLogEntry],
    today: NaiveDate,
) -> DerivedStats {
    let total_steps: u32 = roadmaps.iter().map(|r| r.steps.len() as u32).sum();
    let completed_steps: u32 = roadmaps
        .iter()
        .map(|r| r.steps.iter().filter(|s| s.completed).count() as u32)
        .sum();

    let progress_percentage = if total_steps == 0 {
        0
    } else {
        (completed_steps as f64 / total_steps as f64 * 100.0).round() as u32
    };

    let scores: Vec<u32> = interviews
        .iter()
        .filter_map(|i| i.score.map(u32::from))
        .collect();
    let avg_interview_score = if scores.is_empty() {
        0
    } else {
        (scores.iter().sum::<u32>() as f64 / scores.len() as f64).round() as u32
    };

    DerivedStats {
        total_goals: goals.len() as u32,
        completed_goals: goals.iter().filter(|g| g.completed).count() as u32,
        active_roadmaps: roadmaps.len() as u32,
        total_steps,
        completed_steps,
        progress_percentage,
        total_interviews: interviews.len() as u32,
        avg_interview_score,
        learning_streak: learning_streak(activity, today),
        weekly_hours: weekly_hours(activity, today),
    }
}

/// Count of consecutive local calendar days with at least one activity,
/// walking backward from `today`. A run whose most recent day is yesterday
/// still counts: before the day's first activity the streak should not read
/// as zero. A gap of more than one day resets to 0.
pub fn learning_streak(activity: &[ActivityLogEntry], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = activity.iter().map(|e| local_day(&e.created_at)).collect();
    if days.is_empty() {
        return 0;
    }

    let start = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut cursor = start;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

/// Estimated hours of learning over the trailing 7 calendar days, from fixed
/// per-kind constants
pub fn weekly_hours(activity: &[ActivityLogEntry], today: NaiveDate) -> u32 {
    let window_start = today - chrono::Duration::days(6);
    let hours: f64 = activity
        .iter()
        .filter(|e| {
            let day = local_day(&e.created_at);
            day >= window_start && day <= today
        })
        .map(|e| match e.kind {
            ActivityKind::RoadmapStep => STEP_HOURS,
            ActivityKind::GoalCompleted => GOAL_HOURS,
            ActivityKind::InterviewCompleted => INTERVIEW_HOURS,
            _ => OTHER_HOURS,
        })
        .sum();
    hours.round() as u32
}

fn local_day(timestamp: &DateTime<chrono::Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascent_core::{ActivityMetadata, Difficulty, InterviewQuestion, Resource, RoadmapStep};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// An activity entry stamped at local noon of the given date, so the
    /// local-day grouping is stable regardless of the machine timezone
    fn entry_on(date: NaiveDate, kind: ActivityKind) -> ActivityLogEntry {
        let noon = date.and_hms_opt(12, 0, 0).unwrap();
        let local = Local.from_local_datetime(&noon).single().unwrap();
        ActivityLogEntry {
            id: "a".to_string(),
            kind,
            title: "t".to_string(),
            description: "d".to_string(),
            metadata: ActivityMetadata::None,
            created_at: local.with_timezone(&Utc),
        }
    }

    fn goal(completed: bool) -> Goal {
        Goal {
            id: "g".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            target_date: None,
            completed,
            category: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn roadmap(completed_steps: usize, total_steps: usize) -> Roadmap {
        let steps = (0..total_steps)
            .map(|i| RoadmapStep {
                id: format!("s{}", i),
                title: "step".to_string(),
                description: String::new(),
                completed: i < completed_steps,
                resources: vec![Resource {
                    title: "r".to_string(),
                    resource_type: ascent_core::ResourceType::Article,
                    url: "https://example.com".to_string(),
                    description: None,
                }],
                estimated_time: "1 week".to_string(),
                order: i as u32,
            })
            .collect();
        Roadmap {
            id: "r".to_string(),
            title: "t".to_string(),
            description: String::new(),
            skill: "Rust".to_string(),
            steps,
            estimated_duration: "4 weeks".to_string(),
            difficulty: Difficulty::Beginner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn interview(score: Option<u8>) -> MockInterview {
        MockInterview {
            id: "i".to_string(),
            role: "Engineer".to_string(),
            questions: vec![InterviewQuestion {
                question: "q".to_string(),
                answer: None,
                feedback: None,
                score: None,
            }],
            feedback: None,
            score,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_all_zero_stats() {
        let stats = compute_stats(&[], &[], &[], &[], today());
        assert_eq!(stats, DerivedStats::default());
    }

    #[test]
    fn counts_goals_and_completions() {
        let goals = vec![goal(true), goal(false), goal(true)];
        let stats = compute_stats(&goals, &[], &[], &[], today());
        assert_eq!(stats.total_goals, 3);
        assert_eq!(stats.completed_goals, 2);
    }

    #[test]
    fn progress_percentage_rounds_from_step_counts() {
        let roadmaps = vec![roadmap(4, 10)];
        let stats = compute_stats(&[], &roadmaps, &[], &[], today());
        assert_eq!(stats.total_steps, 10);
        assert_eq!(stats.completed_steps, 4);
        assert_eq!(stats.progress_percentage, 40);
    }

    #[test]
    fn progress_is_zero_with_no_steps() {
        let stats = compute_stats(&[], &[], &[], &[], today());
        assert_eq!(stats.progress_percentage, 0);
    }

    #[test]
    fn average_score_skips_unscored_interviews() {
        let interviews = vec![interview(Some(80)), interview(None), interview(Some(61))];
        let stats = compute_stats(&[], &[], &interviews, &[], today());
        assert_eq!(stats.total_interviews, 3);
        // mean of 80 and 61, rounded
        assert_eq!(stats.avg_interview_score, 71);
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let t = today();
        let activity = vec![
            entry_on(t, ActivityKind::GoalCreated),
            entry_on(t.pred_opt().unwrap(), ActivityKind::RoadmapStep),
            entry_on(t - chrono::Duration::days(2), ActivityKind::GoalCompleted),
        ];
        assert_eq!(learning_streak(&activity, t), 3);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let t = today();
        let activity = vec![
            entry_on(t, ActivityKind::GoalCreated),
            entry_on(t - chrono::Duration::days(3), ActivityKind::GoalCreated),
        ];
        assert_eq!(learning_streak(&activity, t), 1);
    }

    #[test]
    fn streak_ending_yesterday_still_counts() {
        let t = today();
        let activity = vec![
            entry_on(t.pred_opt().unwrap(), ActivityKind::GoalCreated),
            entry_on(t - chrono::Duration::days(2), ActivityKind::RoadmapStep),
        ];
        assert_eq!(learning_streak(&activity, t), 2);
    }

    #[test]
    fn streak_resets_after_a_full_missed_day() {
        let t = today();
        let activity = vec![entry_on(t - chrono::Duration::days(2), ActivityKind::GoalCreated)];
        assert_eq!(learning_streak(&activity, t), 0);
    }

    #[test]
    fn no_activity_means_no_streak() {
        assert_eq!(learning_streak(&[], today()), 0);
    }

    #[test]
    fn weekly_hours_sums_per_kind_estimates() {
        let t = today();
        let activity = vec![
            entry_on(t, ActivityKind::RoadmapStep),                             // 2.0
            entry_on(t.pred_opt().unwrap(), ActivityKind::RoadmapStep),         // 2.0
            entry_on(t - chrono::Duration::days(2), ActivityKind::GoalCompleted), // 1.0
            entry_on(t - chrono::Duration::days(3), ActivityKind::InterviewCompleted), // 0.5
            entry_on(t - chrono::Duration::days(4), ActivityKind::GoalCreated), // 0.25
        ];
        // 5.75 rounds to 6
        assert_eq!(weekly_hours(&activity, t), 6);
    }

    #[test]
    fn weekly_hours_ignores_entries_outside_the_window() {
        let t = today();
        let activity = vec![
            entry_on(t, ActivityKind::GoalCompleted),                            // 1.0
            entry_on(t - chrono::Duration::days(10), ActivityKind::RoadmapStep), // outside
        ];
        assert_eq!(weekly_hours(&activity, t), 1);
    }
}
