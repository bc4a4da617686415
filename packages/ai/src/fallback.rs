// ABOUTME: Deterministic template generators used when the completion provider fails
// ABOUTME: Always produce structurally valid, non-empty results

use chrono::Utc;
use urlencoding::encode;

use ascent_core::{
    generate_step_id, Difficulty, InterviewQuestion, MockInterview, Resource, ResourceType,
    Roadmap, RoadmapStep,
};

use crate::gateway::AssessmentQuestion;

/// Template roadmap for a skill; four steps, each with at least two resources
pub fn roadmap(skill: &str, level: Difficulty, target_role: &str) -> Roadmap {
    let now = Utc::now();
    let estimated_duration = match level {
        Difficulty::Beginner => "8 weeks",
        Difficulty::Intermediate => "6 weeks",
        Difficulty::Advanced => "4 weeks",
    };

    let steps = vec![
        step(
            0,
            format!("Foundations of {skill}"),
            format!("Build a working vocabulary of {skill} fundamentals and set up your environment."),
            "1 week",
            vec![
                resource(
                    format!("{skill} official documentation"),
                    ResourceType::Article,
                    search_url("documentation", skill),
                ),
                resource(
                    format!("Introductory {skill} course"),
                    ResourceType::Course,
                    course_url(skill),
                ),
            ],
        ),
        step(
            1,
            format!("Core {skill} concepts"),
            format!("Work through the central ideas of {skill} with guided material and notes."),
            "2 weeks",
            vec![
                resource(
                    format!("{skill} in depth"),
                    ResourceType::Video,
                    video_url(skill),
                ),
                resource(
                    format!("A practical {skill} handbook"),
                    ResourceType::Book,
                    search_url("book", skill),
                ),
            ],
        ),
        step(
            2,
            format!("Hands-on {skill} project"),
            format!("Apply {skill} in a small end-to-end project you can talk about in interviews."),
            "2 weeks",
            vec![
                resource(
                    format!("{skill} practice exercises"),
                    ResourceType::Practice,
                    practice_url(skill),
                ),
                resource(
                    "Project idea collections".to_string(),
                    ResourceType::Article,
                    search_url("project ideas", skill),
                ),
            ],
        ),
        step(
            3,
            format!("{skill} for the {target_role} role"),
            format!("Review how {skill} shows up in {target_role} interviews and close the gaps."),
            "1 week",
            vec![
                resource(
                    format!("{skill} interview questions"),
                    ResourceType::Article,
                    search_url("interview questions", skill),
                ),
                resource(
                    format!("Mock {skill} problems"),
                    ResourceType::Practice,
                    practice_url(skill),
                ),
            ],
        ),
    ];

    Roadmap {
        id: String::new(),
        title: format!("{skill} learning roadmap"),
        description: format!(
            "A structured path to learn {skill} at {level} level, built around freely available material and one hands-on project."
        ),
        skill: skill.to_string(),
        steps,
        estimated_duration: estimated_duration.to_string(),
        difficulty: level,
        created_at: now,
        updated_at: now,
    }
}

/// Template interview; generic questions parameterized by role and experience
pub fn interview(role: &str, experience: &str) -> MockInterview {
    let questions = vec![
        format!("Walk me through your background and what draws you to a {role} position."),
        format!("Describe a challenging project you worked on. What made it hard and what was your contribution?"),
        format!("What are the core skills a {role} needs day to day, and how have you built them over {experience} of experience?"),
        format!("Tell me about a time you disagreed with a teammate. How did you resolve it?"),
        format!("How do you keep your {role} skills current?"),
        format!("Where do you want to grow next, and how does this role fit that plan?"),
    ];

    MockInterview {
        id: String::new(),
        role: role.to_string(),
        questions: questions
            .into_iter()
            .map(|question| InterviewQuestion {
                question,
                answer: None,
                feedback: None,
                score: None,
            })
            .collect(),
        feedback: None,
        score: None,
        created_at: Utc::now(),
    }
}

/// Template skill assessment; five multiple-choice questions
pub fn assessment(skill: &str) -> Vec<AssessmentQuestion> {
    vec![
        AssessmentQuestion {
            question: format!("How would you rate your hands-on experience with {skill}?"),
            options: vec![
                "I have only read about it".to_string(),
                "I have followed tutorials".to_string(),
                "I have used it in personal projects".to_string(),
                "I have used it in production".to_string(),
            ],
            correct_index: 3,
        },
        AssessmentQuestion {
            question: format!("Which best describes the primary purpose of {skill}?"),
            options: vec![
                "I could explain it to a beginner".to_string(),
                "I have a rough idea".to_string(),
                "I am not sure".to_string(),
                "I have never thought about it".to_string(),
            ],
            correct_index: 0,
        },
        AssessmentQuestion {
            question: format!("When did you last use {skill} to solve a real problem?"),
            options: vec![
                "This week".to_string(),
                "This month".to_string(),
                "This year".to_string(),
                "Never".to_string(),
            ],
            correct_index: 0,
        },
        AssessmentQuestion {
            question: format!("Could you debug an unfamiliar {skill} issue without help?"),
            options: vec![
                "Yes, comfortably".to_string(),
                "Yes, with documentation".to_string(),
                "Only with a teammate".to_string(),
                "No".to_string(),
            ],
            correct_index: 0,
        },
        AssessmentQuestion {
            question: format!("Have you taught or reviewed {skill} work for someone else?"),
            options: vec![
                "Regularly".to_string(),
                "Occasionally".to_string(),
                "Once or twice".to_string(),
                "Never".to_string(),
            ],
            correct_index: 0,
        },
    ]
}

fn step(
    order: u32,
    title: String,
    description: String,
    estimated_time: &str,
    resources: Vec<Resource>,
) -> RoadmapStep {
    RoadmapStep {
        id: generate_step_id(order),
        title,
        description,
        completed: false,
        resources,
        estimated_time: estimated_time.to_string(),
        order,
    }
}

fn resource(title: String, resource_type: ResourceType, url: String) -> Resource {
    Resource {
        title,
        resource_type,
        url,
        description: None,
    }
}

fn search_url(kind: &str, skill: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        encode(&format!("{skill} {kind}"))
    )
}

fn course_url(skill: &str) -> String {
    format!("https://www.coursera.org/search?query={}", encode(skill))
}

fn video_url(skill: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        encode(&format!("{skill} tutorial"))
    )
}

fn practice_url(skill: &str) -> String {
    format!("https://www.exercism.org/search?query={}", encode(skill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roadmap_template_is_structurally_valid() {
        let roadmap = roadmap("Rust", Difficulty::Intermediate, "Backend Engineer");

        assert!(!roadmap.steps.is_empty());
        assert!(roadmap.steps.iter().all(|s| !s.resources.is_empty()));
        for (i, step) in roadmap.steps.iter().enumerate() {
            assert_eq!(step.order, i as u32);
            assert!(!step.id.is_empty());
            assert!(!step.completed);
        }
        assert_eq!(roadmap.skill, "Rust");
        assert_eq!(roadmap.difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn interview_template_has_unanswered_questions() {
        let interview = interview("Data Engineer", "3 years");
        assert!(interview.questions.len() >= 5);
        assert!(interview.questions.iter().all(|q| q.answer.is_none()));
        assert_eq!(interview.role, "Data Engineer");
    }

    #[test]
    fn assessment_template_has_valid_choices() {
        let questions = assessment("SQL");
        assert_eq!(questions.len(), 5);
        for q in &questions {
            assert!(q.options.len() >= 2);
            assert!((q.correct_index as usize) < q.options.len());
        }
    }

    #[test]
    fn query_encoding_escapes_spaces() {
        let url = super::search_url("interview questions", "System Design");
        assert!(url.contains("System%20Design%20interview%20questions"));
    }
}
