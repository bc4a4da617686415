// ABOUTME: AI content gateway for Ascent
// ABOUTME: Completion provider seam, prompt-to-JSON contract, and deterministic fallbacks

pub mod extract;
pub mod fallback;
pub mod gateway;
pub mod prompts;
pub mod service;

// Re-export the gateway surface
pub use gateway::{AiGateway, AssessmentQuestion, GenerationError, InterviewEvaluation};

// Re-export the provider seam
pub use service::{
    AiConfig, AnthropicProvider, CompletionError, CompletionProvider, CompletionResult,
};
