// ABOUTME: AI content gateway with deterministic template fallbacks
// ABOUTME: Primary generation is Result-typed internally; public entry points never fail

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use ascent_core::{
    generate_step_id, Difficulty, InterviewQuestion, MockInterview, Resource, ResourceType,
    Roadmap, RoadmapStep,
};

use crate::extract::{self, ExtractError};
use crate::fallback;
use crate::prompts;
use crate::service::{CompletionError, CompletionProvider};

/// Why a primary generation attempt failed. Callers of the public entry
/// points never see this; it is logged and absorbed by the fallback path.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("response shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("response invalid: {0}")]
    Invalid(&'static str),
}

/// Result of evaluating a mock-interview transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewEvaluation {
    pub feedback: String,
    pub score: u8,
    /// Share of questions that received an answer, 0-100
    pub completion_rate: u8,
}

/// One multiple-choice question of a quick skill assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: u32,
}

// Shapes the provider is instructed to produce. Ids, order indexes and
// timestamps are always minted locally.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoadmapDraft {
    title: String,
    description: String,
    estimated_duration: String,
    steps: Vec<StepDraft>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepDraft {
    title: String,
    description: String,
    estimated_time: String,
    resources: Vec<ResourceDraft>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceDraft {
    title: String,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    url: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InterviewDraft {
    questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluationDraft {
    feedback: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentDraft {
    questions: Vec<AssessmentQuestion>,
}

const ANSWER_KEYWORDS: &[&str] = &[
    "design", "test", "scale", "performance", "experience", "team", "example", "tradeoff",
    "learned", "metric",
];

/// The AI content gateway. Wraps a completion provider with a strict
/// prompt-to-JSON contract and falls back to templates on any failure, so
/// generation never surfaces an error to the product.
pub struct AiGateway {
    provider: Arc<dyn CompletionProvider>,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate_roadmap(
        &self,
        skill: &str,
        level: Difficulty,
        target_role: &str,
    ) -> Roadmap {
        match self.try_generate_roadmap(skill, level, target_role).await {
            Ok(roadmap) => roadmap,
            Err(e) => {
                warn!("Roadmap generation failed ({}), using template", e);
                fallback::roadmap(skill, level, target_role)
            }
        }
    }

    pub async fn generate_mock_interview(&self, role: &str, experience: &str) -> MockInterview {
        match self.try_generate_interview(role, experience).await {
            Ok(interview) => interview,
            Err(e) => {
                warn!("Interview generation failed ({}), using template", e);
                fallback::interview(role, experience)
            }
        }
    }

    pub async fn evaluate_interview(
        &self,
        questions: &[InterviewQuestion],
    ) -> InterviewEvaluation {
        let answered = answered_count(questions);
        if answered == 0 {
            return InterviewEvaluation {
                feedback: "No answers provided. Answer at least one question to receive a score."
                    .to_string(),
                score: 0,
                completion_rate: 0,
            };
        }

        match self.try_evaluate(questions).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!("Interview evaluation failed ({}), using heuristic", e);
                heuristic_evaluation(questions)
            }
        }
    }

    pub async fn generate_skill_assessment(&self, skill: &str) -> Vec<AssessmentQuestion> {
        match self.try_generate_assessment(skill).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Assessment generation failed ({}), using template", e);
                fallback::assessment(skill)
            }
        }
    }

    async fn try_generate_roadmap(
        &self,
        skill: &str,
        level: Difficulty,
        target_role: &str,
    ) -> Result<Roadmap, GenerationError> {
        let text = self
            .provider
            .complete(&prompts::roadmap_prompt(skill, level, target_role))
            .await?;
        let draft: RoadmapDraft = serde_json::from_value(extract::json_object(&text)?)?;

        if draft.steps.is_empty() {
            return Err(GenerationError::Invalid("roadmap has no steps"));
        }
        if draft.steps.iter().any(|s| s.resources.is_empty()) {
            return Err(GenerationError::Invalid("roadmap step has no resources"));
        }

        let now = Utc::now();
        Ok(Roadmap {
            id: String::new(),
            title: draft.title,
            description: draft.description,
            skill: skill.to_string(),
            steps: draft
                .steps
                .into_iter()
                .enumerate()
                .map(|(i, step)| RoadmapStep {
                    id: generate_step_id(i as u32),
                    title: step.title,
                    description: step.description,
                    completed: false,
                    resources: step
                        .resources
                        .into_iter()
                        .map(|r| Resource {
                            title: r.title,
                            resource_type: r.resource_type,
                            url: r.url,
                            description: r.description,
                        })
                        .collect(),
                    estimated_time: step.estimated_time,
                    order: i as u32,
                })
                .collect(),
            estimated_duration: draft.estimated_duration,
            difficulty: level,
            created_at: now,
            updated_at: now,
        })
    }

    async fn try_generate_interview(
        &self,
        role: &str,
        experience: &str,
    ) -> Result<MockInterview, GenerationError> {
        let text = self
            .provider
            .complete(&prompts::interview_prompt(role, experience))
            .await?;
        let draft: InterviewDraft = serde_json::from_value(extract::json_object(&text)?)?;

        if draft.questions.is_empty() {
            return Err(GenerationError::Invalid("interview has no questions"));
        }

        Ok(MockInterview {
            id: String::new(),
            role: role.to_string(),
            questions: draft
                .questions
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
        })
    }

    async fn try_evaluate(
        &self,
        questions: &[InterviewQuestion],
    ) -> Result<InterviewEvaluation, GenerationError> {
        let text = self
            .provider
            .complete(&prompts::evaluation_prompt(questions))
            .await?;
        let draft: EvaluationDraft = serde_json::from_value(extract::json_object(&text)?)?;

        if draft.feedback.trim().is_empty() {
            return Err(GenerationError::Invalid("evaluation feedback is empty"));
        }

        Ok(InterviewEvaluation {
            feedback: draft.feedback,
            score: draft.score.clamp(0.0, 100.0).round() as u8,
            completion_rate: completion_rate(questions),
        })
    }

    async fn try_generate_assessment(
        &self,
        skill: &str,
    ) -> Result<Vec<AssessmentQuestion>, GenerationError> {
        let text = self
            .provider
            .complete(&prompts::assessment_prompt(skill))
            .await?;
        let draft: AssessmentDraft = serde_json::from_value(extract::json_object(&text)?)?;

        if draft.questions.is_empty() {
            return Err(GenerationError::Invalid("assessment has no questions"));
        }
        if draft
            .questions
            .iter()
            .any(|q| q.options.len() < 2 || q.correct_index as usize >= q.options.len())
        {
            return Err(GenerationError::Invalid("assessment options malformed"));
        }

        Ok(draft.questions)
    }
}

fn answered_count(questions: &[InterviewQuestion]) -> usize {
    questions
        .iter()
        .filter(|q| q.answer.as_deref().is_some_and(|a| !a.trim().is_empty()))
        .count()
}

fn completion_rate(questions: &[InterviewQuestion]) -> u8 {
    if questions.is_empty() {
        return 0;
    }
    let rate = answered_count(questions) as f64 / questions.len() as f64 * 100.0;
    rate.round() as u8
}

/// Scores answered questions by word-count bucket with a small keyword bonus.
/// Unanswered questions are excluded from the average but reflected in the
/// completion rate.
fn heuristic_evaluation(questions: &[InterviewQuestion]) -> InterviewEvaluation {
    let mut rng = rand::thread_rng();
    let mut scores = Vec::new();

    for question in questions {
        let Some(answer) = question.answer.as_deref().filter(|a| !a.trim().is_empty()) else {
            continue;
        };

        let words = answer.split_whitespace().count();
        let base: u32 = match words {
            0..=9 => rng.gen_range(35..=50),
            10..=29 => rng.gen_range(50..=68),
            30..=59 => rng.gen_range(62..=82),
            _ => rng.gen_range(72..=90),
        };

        let lowered = answer.to_lowercase();
        let keyword_hits = ANSWER_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(**kw))
            .count() as u32;
        let bonus = (keyword_hits * 2).min(8);

        scores.push((base + bonus).min(100));
    }

    let rate = completion_rate(questions);
    let score = (scores.iter().sum::<u32>() as f64 / scores.len() as f64).round() as u8;

    let quality = match score {
        75..=100 => "Strong answers overall.",
        55..=74 => "Solid answers with room to add depth.",
        _ => "Answers need more detail and concrete examples.",
    };
    let feedback = format!(
        "{} You answered {}% of the questions. Expand on specifics like measurable outcomes and the reasoning behind your decisions to score higher.",
        quality, rate
    );

    InterviewEvaluation {
        feedback,
        score,
        completion_rate: rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::CompletionResult;
    use async_trait::async_trait;

    /// Provider that always fails, forcing the fallback path
    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        async fn complete(&self, _prompt: &str) -> CompletionResult<String> {
            Err(CompletionError::QuotaExceeded)
        }
    }

    /// Provider that returns one canned response for every prompt
    struct ScriptedProvider(String);

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, _prompt: &str) -> CompletionResult<String> {
            Ok(self.0.clone())
        }
    }

    fn failing_gateway() -> AiGateway {
        AiGateway::new(Arc::new(FailingProvider))
    }

    fn question(text: &str, answer: Option<&str>) -> InterviewQuestion {
        InterviewQuestion {
            question: text.to_string(),
            answer: answer.map(str::to_string),
            feedback: None,
            score: None,
        }
    }

    #[tokio::test]
    async fn roadmap_fallback_is_always_structurally_valid() {
        let roadmap = failing_gateway()
            .generate_roadmap("Kubernetes", Difficulty::Beginner, "Platform Engineer")
            .await;

        assert!(!roadmap.steps.is_empty());
        assert!(roadmap.steps.iter().all(|s| !s.resources.is_empty()));
    }

    #[tokio::test]
    async fn roadmap_parses_fenced_provider_output() {
        let response = r#"Sure, here is your roadmap:

```json
{
  "title": "Rust from zero",
  "description": "A plan",
  "estimatedDuration": "6 weeks",
  "steps": [
    {
      "title": "Ownership",
      "description": "Learn the borrow checker",
      "estimatedTime": "1 week",
      "resources": [
        { "title": "The Book", "type": "book", "url": "https://doc.rust-lang.org/book/" }
      ]
    }
  ]
}
```"#;
        let gateway = AiGateway::new(Arc::new(ScriptedProvider(response.to_string())));
        let roadmap = gateway
            .generate_roadmap("Rust", Difficulty::Beginner, "Backend Engineer")
            .await;

        assert_eq!(roadmap.title, "Rust from zero");
        assert_eq!(roadmap.steps.len(), 1);
        assert_eq!(roadmap.steps[0].order, 0);
        assert_eq!(roadmap.steps[0].resources[0].resource_type, ResourceType::Book);
        assert_eq!(roadmap.skill, "Rust");
    }

    #[tokio::test]
    async fn provider_roadmap_without_resources_falls_back() {
        let response = r#"{
  "title": "Bad",
  "description": "",
  "estimatedDuration": "1 week",
  "steps": [
    { "title": "s", "description": "", "estimatedTime": "1 day", "resources": [] }
  ]
}"#;
        let gateway = AiGateway::new(Arc::new(ScriptedProvider(response.to_string())));
        let roadmap = gateway
            .generate_roadmap("Go", Difficulty::Advanced, "SRE")
            .await;

        // fell back to the template, which always carries resources
        assert!(roadmap.steps.iter().all(|s| !s.resources.is_empty()));
        assert_ne!(roadmap.title, "Bad");
    }

    #[tokio::test]
    async fn interview_fallback_has_questions() {
        let interview = failing_gateway()
            .generate_mock_interview("Data Scientist", "2 years")
            .await;

        assert!(!interview.questions.is_empty());
        assert_eq!(interview.role, "Data Scientist");
    }

    #[tokio::test]
    async fn zero_answers_scores_zero_with_message() {
        let questions = vec![question("Q1", None), question("Q2", Some("   "))];

        let evaluation = failing_gateway().evaluate_interview(&questions).await;

        assert_eq!(evaluation.score, 0);
        assert_eq!(evaluation.completion_rate, 0);
        assert!(evaluation.feedback.contains("No answers provided"));
    }

    #[tokio::test]
    async fn heuristic_scores_answered_questions_only() {
        let questions = vec![
            question(
                "Q1",
                Some("I led the design of a caching layer and added tests to verify performance under load, a project the whole team learned from."),
            ),
            question("Q2", None),
        ];

        let evaluation = failing_gateway().evaluate_interview(&questions).await;

        assert!(evaluation.score > 0);
        assert!(evaluation.score <= 100);
        assert_eq!(evaluation.completion_rate, 50);
    }

    #[tokio::test]
    async fn evaluation_uses_provider_result_when_valid() {
        let response = r#"{ "feedback": "Good depth on systems questions.", "score": 81 }"#;
        let gateway = AiGateway::new(Arc::new(ScriptedProvider(response.to_string())));
        let questions = vec![question("Q1", Some("A thorough answer."))];

        let evaluation = gateway.evaluate_interview(&questions).await;

        assert_eq!(evaluation.score, 81);
        assert_eq!(evaluation.feedback, "Good depth on systems questions.");
        assert_eq!(evaluation.completion_rate, 100);
    }

    #[tokio::test]
    async fn out_of_range_provider_score_is_clamped() {
        let response = r#"{ "feedback": "ok", "score": 250 }"#;
        let gateway = AiGateway::new(Arc::new(ScriptedProvider(response.to_string())));
        let questions = vec![question("Q1", Some("answer"))];

        let evaluation = gateway.evaluate_interview(&questions).await;
        assert_eq!(evaluation.score, 100);
    }

    #[tokio::test]
    async fn assessment_fallback_is_well_formed() {
        let questions = failing_gateway().generate_skill_assessment("GraphQL").await;

        assert!(!questions.is_empty());
        for q in &questions {
            assert!(q.options.len() >= 2);
            assert!((q.correct_index as usize) < q.options.len());
        }
    }
}
