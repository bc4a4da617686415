// ABOUTME: Prompt builders for the AI content gateway
// ABOUTME: Every prompt demands a single JSON object in a documented shape

use ascent_core::{Difficulty, InterviewQuestion};

pub fn roadmap_prompt(skill: &str, level: Difficulty, target_role: &str) -> String {
    format!(
        r#"You are a career coach creating a learning roadmap.

Create a learning roadmap for the skill "{skill}" at {level} level, for someone targeting a role of "{target_role}".

Respond with a single JSON object only, no other text, in exactly this shape:
{{
  "title": "roadmap title",
  "description": "one-paragraph summary",
  "estimatedDuration": "e.g. 6 weeks",
  "steps": [
    {{
      "title": "step title",
      "description": "what to do in this step",
      "estimatedTime": "e.g. 1 week",
      "resources": [
        {{
          "title": "resource title",
          "type": "video|article|course|book|practice",
          "url": "https://...",
          "description": "optional one-liner"
        }}
      ]
    }}
  ]
}}

Include 4 to 6 steps, each with 2 to 3 resources. Use real, well-known resources where possible."#
    )
}

pub fn interview_prompt(role: &str, experience: &str) -> String {
    format!(
        r#"You are an experienced technical interviewer.

Generate a mock interview for a "{role}" candidate with {experience} experience.

Respond with a single JSON object only, no other text, in exactly this shape:
{{
  "questions": ["question 1", "question 2"]
}}

Include 5 to 7 questions mixing technical depth, practical scenarios, and behavioral topics appropriate for the role."#
    )
}

pub fn evaluation_prompt(questions: &[InterviewQuestion]) -> String {
    let mut transcript = String::new();
    for (i, q) in questions.iter().enumerate() {
        transcript.push_str(&format!("Q{}: {}\n", i + 1, q.question));
        match &q.answer {
            Some(answer) if !answer.trim().is_empty() => {
                transcript.push_str(&format!("A{}: {}\n\n", i + 1, answer));
            }
            _ => transcript.push_str(&format!("A{}: (no answer)\n\n", i + 1)),
        }
    }

    format!(
        r#"You are an experienced technical interviewer evaluating a mock interview transcript.

Transcript:
{transcript}
Respond with a single JSON object only, no other text, in exactly this shape:
{{
  "feedback": "2-4 sentences of constructive feedback",
  "score": 0
}}

The score is an integer from 0 to 100 reflecting overall answer quality. Unanswered questions should lower the score."#
    )
}

pub fn assessment_prompt(skill: &str) -> String {
    format!(
        r#"You are building a quick knowledge check.

Generate a short skill assessment for "{skill}".

Respond with a single JSON object only, no other text, in exactly this shape:
{{
  "questions": [
    {{
      "question": "question text",
      "options": ["option a", "option b", "option c", "option d"],
      "correctIndex": 0
    }}
  ]
}}

Include 5 multiple-choice questions of mixed difficulty with exactly 4 options each."#
    )
}
