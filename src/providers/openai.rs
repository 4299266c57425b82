//! OpenAI chat-completions client and research agent

use crate::agent::{validate_query, ResearchAgent};
use crate::config::presets;
use crate::error::{Error, Result};
use crate::parse::parse_research_text;
use crate::prompt;
use crate::types::{ResearchDomain, ResearchResponse};
use async_trait::async_trait;
use chrono::Utc;
use dotenvy::dotenv;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// OpenAI client configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key (loaded from environment variable)
    pub api_key: SecretString,
    /// Base URL for the chat-completions API
    pub base_url: Url,
    /// Request timeout
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a configuration from `OPENAI_API_KEY`
    pub fn from_env() -> Result<Self> {
        // Load .env if present so local development picks up the key
        let _ = dotenv();

        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::config("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self::new(api_key))
    }

    /// Create a configuration with a specific API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: Url::parse("https://api.openai.com/v1").expect("valid OpenAI URL"),
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the API key as a string
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Message in a chat-completions conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completions request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<ChatMessage>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens for completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Chat-completions response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Choices returned by the model
    pub choices: Vec<ChatChoice>,
    /// Token usage, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, empty when none was returned
    pub fn first_content(&self) -> String {
        self.choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}

/// Choice in a chat-completions response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Message content
    pub message: ChatMessage,
}

/// Token usage in a chat-completions response
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChatUsage {
    /// Prompt tokens
    pub prompt_tokens: u64,
    /// Completion tokens
    pub completion_tokens: u64,
    /// Total tokens
    pub total_tokens: u64,
}

/// Low-level chat-completions client
///
/// Shared by the OpenAI agent, the Ollama agent (OpenAI-compatible
/// endpoint) and the master synthesizer.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client with the given configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Send a completion request
    pub async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", base(&self.config.base_url));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::other(format!(
                "Request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        Ok(completion)
    }

    /// Get the configuration
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

/// Base URL with any trailing slash removed so path joins stay clean
fn base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

/// Research agent backed by OpenAI's chat-completions API
pub struct OpenAiAgent {
    client: OpenAiClient,
    model_name: String,
}

impl OpenAiAgent {
    /// Create a new agent from `OPENAI_API_KEY` with the default model
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?, presets::OPENAI_GPT4O)
    }

    /// Create a new agent with the given configuration and model
    pub fn new(config: OpenAiConfig, model_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: OpenAiClient::new(config)?,
            model_name: model_name.into(),
        })
    }
}

#[async_trait]
impl ResearchAgent for OpenAiAgent {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn research(
        &self,
        query: &str,
        domain: ResearchDomain,
        max_tokens: Option<u32>,
    ) -> Result<ResearchResponse> {
        validate_query(query)?;

        let mut request = ChatCompletionRequest::new(
            &self.model_name,
            vec![
                ChatMessage::system(prompt::system_prompt(domain)),
                ChatMessage::user(prompt::research_prompt(query)),
            ],
        )
        .with_temperature(0.7);
        if let Some(max_tokens) = max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self
            .client
            .complete(request)
            .await
            .map_err(|e| Error::agent(&self.model_name, e.to_string()))?;

        let tokens_used = response.usage.map(|usage| usage.total_tokens);
        let parsed = parse_research_text(&response.first_content());
        if parsed.answer.is_empty() {
            return Err(Error::agent(&self.model_name, "provider returned an empty response"));
        }

        Ok(ResearchResponse {
            query: query.to_string(),
            answer: parsed.answer,
            domain,
            confidence: parsed.confidence,
            key_points: parsed.key_points,
            sources: parsed.sources,
            model_name: self.model_name.clone(),
            timestamp: Utc::now(),
            tokens_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(server: &mockito::ServerGuard) -> OpenAiConfig {
        OpenAiConfig::new("test-key")
            .with_base_url(Url::parse(&server.url()).unwrap())
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_research_parses_structured_response() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "1. ANSWER:\nExercise strengthens the heart.\n\n2. KEY POINTS:\n- Improves cardiovascular health\n- Boosts mood\n\n3. CONFIDENCE: high\n"
                }
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200}
        });
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let agent = OpenAiAgent::new(test_config(&server), "gpt-4o").unwrap();
        let response = agent
            .research("Benefits of exercise?", ResearchDomain::Healthcare, Some(500))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.model_name, "gpt-4o");
        assert_eq!(response.answer, "Exercise strengthens the heart.");
        assert_eq!(response.key_points.len(), 2);
        assert_eq!(response.tokens_used, Some(200));
        assert_eq!(response.confidence.as_str(), "high");
    }

    #[tokio::test]
    async fn test_provider_error_carries_agent_identity() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("{\"error\": \"invalid key\"}")
            .create_async()
            .await;

        let agent = OpenAiAgent::new(test_config(&server), "gpt-4o").unwrap();
        let err = agent
            .research("Benefits of exercise?", ResearchDomain::Healthcare, None)
            .await
            .unwrap_err();

        match err {
            Error::Agent { model, message } => {
                assert_eq!(model, "gpt-4o");
                assert!(message.contains("401"));
            }
            other => panic!("expected agent error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_query_fails_before_network() {
        let server = mockito::Server::new_async().await;
        let agent = OpenAiAgent::new(test_config(&server), "gpt-4o").unwrap();
        let err = agent
            .research("  ", ResearchDomain::Sports, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAiConfig::new("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
