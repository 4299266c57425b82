//! Ollama local-model research agent
//!
//! Ollama exposes an OpenAI-compatible chat-completions endpoint under
//! `/v1`, so this agent reuses the OpenAI client with a different base URL
//! and a placeholder key. A health probe against `/api/tags` lets callers
//! skip the agent when no local server is running.

use crate::agent::{validate_query, ResearchAgent};
use crate::config::presets;
use crate::error::{Error, Result};
use crate::parse::parse_research_text;
use crate::prompt;
use crate::providers::openai::{ChatCompletionRequest, ChatMessage, OpenAiClient, OpenAiConfig};
use crate::types::{ResearchDomain, ResearchResponse};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Ollama client configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server (e.g., "http://localhost:11434")
    pub base_url: Url,
    /// Request timeout; local reasoning models can take minutes
    pub timeout: Duration,
}

impl OllamaConfig {
    /// Create a configuration from `OLLAMA_BASE_URL`, defaulting to the
    /// standard local port
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| Error::config(format!("Invalid OLLAMA_BASE_URL: {e}")))?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(300),
        })
    }

    /// Create a configuration with a specific base URL
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(300),
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Research agent backed by a locally-hosted model served via Ollama
pub struct OllamaAgent {
    chat: OpenAiClient,
    probe: Client,
    config: OllamaConfig,
    model_name: String,
}

impl OllamaAgent {
    /// Create a new agent from the environment with the default model
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env()?, presets::DEEPSEEK_R1)
    }

    /// Create a new agent with the given configuration and model
    pub fn new(config: OllamaConfig, model_name: impl Into<String>) -> Result<Self> {
        // Ollama ignores the bearer token; the client just requires one
        let v1 = config
            .base_url
            .join("v1")
            .map_err(|e| Error::config(format!("Invalid Ollama base URL: {e}")))?;
        let chat = OpenAiClient::new(
            OpenAiConfig::new("ollama")
                .with_base_url(v1)
                .with_timeout(config.timeout),
        )?;
        let probe = Client::builder().timeout(Duration::from_secs(5)).build()?;

        Ok(Self {
            chat,
            probe,
            config,
            model_name: model_name.into(),
        })
    }

    /// Check whether the Ollama server is reachable
    pub async fn is_available(&self) -> bool {
        let url = format!(
            "{}/api/tags",
            self.config.base_url.as_str().trim_end_matches('/')
        );
        match self.probe.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl ResearchAgent for OllamaAgent {
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
            .chat
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

    #[tokio::test]
    async fn test_health_probe_reports_running_server() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body("{\"models\": []}")
            .create_async()
            .await;

        let config = OllamaConfig::new(Url::parse(&server.url()).unwrap());
        let agent = OllamaAgent::new(config, "deepseek-r1:14b").unwrap();
        assert!(agent.is_available().await);
    }

    #[tokio::test]
    async fn test_health_probe_reports_down_server() {
        // Unroutable port; connection refused means not available
        let config = OllamaConfig::new(Url::parse("http://127.0.0.1:1").unwrap());
        let agent = OllamaAgent::new(config, "deepseek-r1:14b").unwrap();
        assert!(!agent.is_available().await);
    }

    #[tokio::test]
    async fn test_research_goes_through_openai_compatible_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "ANSWER:\nLocal models answer locally.\nCONFIDENCE: low\n"
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        });
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let config = OllamaConfig::new(Url::parse(&server.url()).unwrap());
        let agent = OllamaAgent::new(config, "deepseek-r1:14b").unwrap();
        let response = agent
            .research("Does this run locally?", ResearchDomain::Shopping, None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.answer, "Local models answer locally.");
        assert_eq!(response.tokens_used, Some(30));
    }
}
