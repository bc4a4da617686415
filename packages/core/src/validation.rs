use thiserror::Error;

use crate::types::{GoalCreateInput, MockInterview, ProfileUpdateInput, Roadmap};

const MAX_TITLE_LEN: usize = 200;
const MAX_BIO_LEN: usize = 2000;
const MAX_SKILL_LEN: usize = 100;

/// A single validation failure; writes are rejected when any are present
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

fn check_title(title: &str, field: &'static str, errors: &mut Vec<ValidationError>) {
    if title.trim().is_empty() {
        errors.push(ValidationError::Required { field });
    } else if title.len() > MAX_TITLE_LEN {
        errors.push(ValidationError::TooLong {
            field,
            max: MAX_TITLE_LEN,
        });
    }
}

/// Validates input for creating a goal
pub fn validate_goal_input(input: &GoalCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_title(&input.title, "title", &mut errors);
    errors
}

/// Validates a roadmap before persistence
pub fn validate_roadmap(roadmap: &Roadmap) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_title(&roadmap.title, "title", &mut errors);
    if roadmap.skill.trim().is_empty() {
        errors.push(ValidationError::Required { field: "skill" });
    } else if roadmap.skill.len() > MAX_SKILL_LEN {
        errors.push(ValidationError::TooLong {
            field: "skill",
            max: MAX_SKILL_LEN,
        });
    }
    if roadmap.steps.is_empty() {
        errors.push(ValidationError::Empty { field: "steps" });
    }
    errors
}

/// Validates a mock interview before persistence
pub fn validate_interview(interview: &MockInterview) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_title(&interview.role, "role", &mut errors);
    if interview.questions.is_empty() {
        errors.push(ValidationError::Empty { field: "questions" });
    }
    if let Some(score) = interview.score {
        if score > 100 {
            errors.push(ValidationError::OutOfRange {
                field: "score",
                min: 0,
                max: 100,
            });
        }
    }
    errors
}

/// Validates a profile update
pub fn validate_profile_update(patch: &ProfileUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Some(name) = &patch.display_name {
        if name.trim().is_empty() {
            errors.push(ValidationError::Empty {
                field: "displayName",
            });
        }
    }
    if let Some(bio) = &patch.bio {
        if bio.len() > MAX_BIO_LEN {
            errors.push(ValidationError::TooLong {
                field: "bio",
                max: MAX_BIO_LEN,
            });
        }
    }
    errors
}

/// Truncates a string to `max` characters, appending an ellipsis when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
