//! Council configuration parsing from YAML templates
//!
//! A council template names the member agents (provider, model, optional
//! endpoint override), the synthesis strategy, and per-model price
//! overrides. Credentials never live in the template; they come from the
//! environment when the agents are built.

use crate::agent::ResearchAgent;
use crate::config::{presets, PriceTable};
use crate::council::aggregator::ResponseAggregator;
use crate::council::synthesizer::MasterSynthesizer;
use crate::error::{Error, Result};
use crate::providers::{
    GeminiAgent, GeminiConfig, OllamaAgent, OllamaConfig, OpenAiAgent, OpenAiConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Synthesis strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Deterministic reduction, no further network call
    #[default]
    RuleBased,
    /// Delegate synthesis to a reasoning model
    Master,
}

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI chat-completions API
    Openai,
    /// Google Gemini generateContent API
    Gemini,
    /// Local Ollama server (OpenAI-compatible endpoint)
    Ollama,
}

/// Agent instantiation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Provider backend for this agent
    pub provider: ProviderKind,
    /// Model identifier (e.g., "gpt-4o")
    pub model: String,
    /// Optional endpoint override (local servers, proxies)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl AgentSpec {
    /// Build a research agent from this spec, pulling credentials from
    /// the environment
    pub fn build(&self) -> Result<Arc<dyn ResearchAgent>> {
        let base_url = self
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| Error::config(format!("Invalid base_url for {}: {e}", self.model)))?;

        match self.provider {
            ProviderKind::Openai => {
                let mut config = OpenAiConfig::from_env()?;
                if let Some(url) = base_url {
                    config = config.with_base_url(url);
                }
                Ok(Arc::new(OpenAiAgent::new(config, &self.model)?))
            }
            ProviderKind::Gemini => {
                let mut config = GeminiConfig::from_env()?;
                if let Some(url) = base_url {
                    config = config.with_base_url(url);
                }
                Ok(Arc::new(GeminiAgent::new(config, &self.model)?))
            }
            ProviderKind::Ollama => {
                let config = match base_url {
                    Some(url) => OllamaConfig::new(url),
                    None => OllamaConfig::from_env()?,
                };
                Ok(Arc::new(OllamaAgent::new(config, &self.model)?))
            }
        }
    }
}

/// Top-level council configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Synthesis strategy (rule_based or master)
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Model for master synthesis, defaulting to gpt-4o
    #[serde(default)]
    pub master_model: Option<String>,
    /// Council members
    pub agents: Vec<AgentSpec>,
    /// Worker price overrides in USD per 1M tokens
    #[serde(default)]
    pub pricing: HashMap<String, f64>,
}

impl CouncilConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse YAML: {e}")))
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read file: {e}")))?;
        Self::from_yaml(&content)
    }

    /// Build all configured agents
    pub fn build_agents(&self) -> Result<Vec<Arc<dyn ResearchAgent>>> {
        self.agents.iter().map(AgentSpec::build).collect()
    }

    /// Default worker price table with this template's overrides applied
    pub fn worker_pricing(&self) -> PriceTable {
        let mut pricing = PriceTable::default();
        pricing.extend(self.pricing.clone());
        pricing
    }

    /// Build the aggregator for the configured strategy
    ///
    /// The master strategy requires `OPENAI_API_KEY`; a missing credential
    /// surfaces here, before any research runs.
    pub fn build_aggregator(&self) -> Result<ResponseAggregator> {
        let aggregator = match self.strategy {
            StrategyKind::RuleBased => ResponseAggregator::rule_based(),
            StrategyKind::Master => {
                let model = self
                    .master_model
                    .clone()
                    .unwrap_or_else(|| presets::OPENAI_GPT4O.to_string());
                let synthesizer = MasterSynthesizer::new(OpenAiConfig::from_env()?, model)?;
                ResponseAggregator::with_master(synthesizer)
            }
        };
        Ok(aggregator.with_pricing(self.worker_pricing()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_based_council() {
        let yaml = r#"
strategy: rule_based
agents:
  - provider: openai
    model: "gpt-4o"
  - provider: gemini
    model: "gemini-2.5-flash"
  - provider: ollama
    model: "deepseek-r1:14b"
    base_url: "http://localhost:11434"
"#;
        let config = CouncilConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.strategy, StrategyKind::RuleBased);
        assert_eq!(config.agents.len(), 3);
        assert_eq!(config.agents[2].provider, ProviderKind::Ollama);
        assert_eq!(
            config.agents[2].base_url.as_deref(),
            Some("http://localhost:11434")
        );
    }

    #[test]
    fn test_parse_master_council_with_pricing_overrides() {
        let yaml = r#"
strategy: master
master_model: "o1-mini"
agents:
  - provider: openai
    model: "gpt-4o"
pricing:
  gpt-4o: 0.3
"#;
        let config = CouncilConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.strategy, StrategyKind::Master);
        assert_eq!(config.master_model.as_deref(), Some("o1-mini"));
        let pricing = config.worker_pricing();
        assert_eq!(pricing.price_per_million("gpt-4o"), 0.3);
        // Defaults survive alongside overrides
        assert_eq!(pricing.price_per_million("gemini-2.5-flash"), 0.0);
    }

    #[test]
    fn test_strategy_defaults_to_rule_based() {
        let yaml = r#"
agents:
  - provider: openai
    model: "gpt-4o"
"#;
        let config = CouncilConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.strategy, StrategyKind::RuleBased);
    }

    #[test]
    fn test_unknown_provider_is_a_configuration_error() {
        let yaml = r#"
agents:
  - provider: telepathy
    model: "crystal-ball"
"#;
        assert!(CouncilConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_base_url_fails_at_build() {
        let spec = AgentSpec {
            provider: ProviderKind::Ollama,
            model: "deepseek-r1:14b".to_string(),
            base_url: Some("not a url".to_string()),
        };
        assert!(matches!(spec.build(), Err(Error::Config(_))));
    }
}
