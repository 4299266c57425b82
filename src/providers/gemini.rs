//! Gemini research agent using the generateContent API

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

/// Gemini client configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (loaded from environment variable)
    pub api_key: SecretString,
    /// Base URL for the Gemini API
    pub base_url: Url,
    /// Request timeout
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Create a configuration from `GEMINI_API_KEY`
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::config("GEMINI_API_KEY environment variable not set"))?;

        Ok(Self::new(api_key))
    }

    /// Create a configuration with a specific API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: Url::parse("https://generativelanguage.googleapis.com/v1beta")
                .expect("valid Gemini URL"),
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

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: u64,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Research agent backed by Google's Gemini API
pub struct GeminiAgent {
    client: Client,
    config: GeminiConfig,
    model_name: String,
}

impl GeminiAgent {
    /// Create a new agent from `GEMINI_API_KEY` with the default model
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?, presets::GEMINI_FLASH)
    }

    /// Create a new agent with the given configuration and model
    pub fn new(config: GeminiConfig, model_name: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            model_name: model_name.into(),
        })
    }

    async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.as_str().trim_end_matches('/'),
            self.model_name
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key())
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

        let body: GenerateContentResponse = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl ResearchAgent for GeminiAgent {
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

        // Gemini takes one combined prompt rather than role-separated
        // messages, so the system prompt is prepended to the user prompt.
        let full_prompt = format!(
            "{}\n\n{}",
            prompt::system_prompt(domain),
            prompt::research_prompt(query)
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: full_prompt }],
            }],
            generation_config: max_tokens.map(|max_output_tokens| GenerationConfig {
                max_output_tokens,
            }),
        };

        let response = self
            .generate(request)
            .await
            .map_err(|e| Error::agent(&self.model_name, e.to_string()))?;

        let tokens_used = response
            .usage_metadata
            .as_ref()
            .map(|usage| usage.total_token_count);
        let parsed = parse_research_text(&response.text());
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

    fn test_config(server: &mockito::ServerGuard) -> GeminiConfig {
        GeminiConfig::new("test-key")
            .with_base_url(Url::parse(&server.url()).unwrap())
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_research_reads_usage_metadata() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "ANSWER:\nHeart health improves with training.\n\nCONFIDENCE: medium\n"}]
                }
            }],
            "usageMetadata": {"totalTokenCount": 321}
        });
        let mock = server
            .mock(
                "POST",
                "/models/gemini-2.5-flash:generateContent",
            )
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let agent = GeminiAgent::new(test_config(&server), "gemini-2.5-flash").unwrap();
        let response = agent
            .research("Benefits of exercise?", ResearchDomain::Healthcare, None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.answer, "Heart health improves with training.");
        assert_eq!(response.tokens_used, Some(321));
    }

    #[tokio::test]
    async fn test_missing_candidates_fail_the_agent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/models/gemini-2.5-flash:generateContent",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let agent = GeminiAgent::new(test_config(&server), "gemini-2.5-flash").unwrap();
        let err = agent
            .research("Benefits of exercise?", ResearchDomain::Healthcare, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Agent { .. }));
    }
}
