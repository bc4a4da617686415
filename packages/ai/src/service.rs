// ABOUTME: Completion provider seam and the Anthropic-backed implementation
// ABOUTME: Handles API requests, response parsing, and failure classification

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::{error, info};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("No API key configured")]
    NoApiKey,

    #[error("Invalid API credentials")]
    InvalidApiKey,

    #[error("Provider quota exceeded")]
    QuotaExceeded,

    #[error("Request blocked by content safety policy")]
    SafetyBlocked,

    #[error("Provider error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,
}

pub type CompletionResult<T> = Result<T, CompletionError>;

/// The generative completion seam: one prompt in, free-form text out. The
/// text carries no structure guarantee; callers parse defensively.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> CompletionResult<String>;
}

/// Completion provider settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl AiConfig {
    /// API key is fetched from ASCENT_AI_API_KEY, falling back to
    /// ANTHROPIC_API_KEY
    pub fn from_env() -> Self {
        let api_key = env::var("ASCENT_AI_API_KEY")
            .or_else(|_| env::var("ANTHROPIC_API_KEY"))
            .ok();
        if api_key.is_none() {
            info!("No AI API key set; generation will use template fallbacks");
        }
        Self {
            api_key,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

/// Anthropic-backed completion provider
pub struct AnthropicProvider {
    client: Client,
    config: AiConfig,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Points the provider at a different endpoint; used by tests
    pub fn with_base_url(config: AiConfig, base_url: String) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> CompletionResult<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(CompletionError::NoApiKey)?;

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        info!("Making completion request: model={}", request.model);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Completion API error: {} - {}", status, message);
            return Err(match status.as_u16() {
                401 | 403 => CompletionError::InvalidApiKey,
                429 => CompletionError::QuotaExceeded,
                _ if message.contains("safety") => CompletionError::SafetyBlocked,
                code => CompletionError::Api { status: code, message },
            });
        }

        let parsed: AnthropicResponse = response.json().await.map_err(|e| {
            error!("Failed to parse completion response: {}", e);
            CompletionError::EmptyResponse
        })?;

        let text = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> AnthropicProvider {
        let config = AiConfig {
            api_key: Some("test-key".to_string()),
            ..AiConfig::default()
        };
        AnthropicProvider::with_base_url(config, server.uri())
    }

    #[tokio::test]
    async fn returns_first_content_block_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "text", "text": "{\"ok\":true}" }],
            })))
            .mount(&server)
            .await;

        let text = provider(&server).complete("prompt").await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn quota_status_maps_to_quota_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider(&server).complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::QuotaExceeded));
    }

    #[tokio::test]
    async fn auth_status_maps_to_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider(&server).complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::InvalidApiKey));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let config = AiConfig::default();
        let provider = AnthropicProvider::new(config);

        let err = provider.complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::NoApiKey));
    }

    #[tokio::test]
    async fn empty_content_is_an_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
            .mount(&server)
            .await;

        let err = provider(&server).complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }
}
