//! Core type definitions for the council framework

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Research domain a query belongs to
///
/// Used only to select a domain-specific system prompt; the closed set
/// keeps invalid domain strings out of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDomain {
    /// Scores, standings, player statistics
    Sports,
    /// Markets, economic indicators, investments
    Finance,
    /// Product comparisons and purchasing decisions
    Shopping,
    /// Health and wellness topics
    Healthcare,
}

impl ResearchDomain {
    /// All domains, in declaration order
    pub const ALL: [ResearchDomain; 4] = [
        ResearchDomain::Sports,
        ResearchDomain::Finance,
        ResearchDomain::Shopping,
        ResearchDomain::Healthcare,
    ];

    /// Lowercase name used in prompts, directories and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchDomain::Sports => "sports",
            ResearchDomain::Finance => "finance",
            ResearchDomain::Shopping => "shopping",
            ResearchDomain::Healthcare => "healthcare",
        }
    }
}

impl fmt::Display for ResearchDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How confident a model is in its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Low confidence
    Low,
    /// Medium confidence (default when a model does not state one)
    Medium,
    /// High confidence
    High,
    /// Very high confidence
    VeryHigh,
}

impl ConfidenceLevel {
    /// Numeric rank: low=1, medium=2, high=3, very_high=4
    pub fn rank(&self) -> u8 {
        match self {
            ConfidenceLevel::Low => 1,
            ConfidenceLevel::Medium => 2,
            ConfidenceLevel::High => 3,
            ConfidenceLevel::VeryHigh => 4,
        }
    }

    /// Inverse of [`rank`](Self::rank); out-of-range values clamp to the ends
    pub fn from_rank(rank: u8) -> Self {
        match rank {
            0 | 1 => ConfidenceLevel::Low,
            2 => ConfidenceLevel::Medium,
            3 => ConfidenceLevel::High,
            _ => ConfidenceLevel::VeryHigh,
        }
    }

    /// Snake-case label as it appears in prompts and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::VeryHigh => "very_high",
        }
    }

    /// Parse a label, accepting both "very_high" and "very high"
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().replace(' ', "_").as_str() {
            "low" => Some(ConfidenceLevel::Low),
            "medium" => Some(ConfidenceLevel::Medium),
            "high" => Some(ConfidenceLevel::High),
            "very_high" => Some(ConfidenceLevel::VeryHigh),
            _ => None,
        }
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        ConfidenceLevel::Medium
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token usage statistics for a single completion call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,
    /// Number of completion tokens
    pub completion_tokens: u64,
    /// Total tokens (prompt + completion)
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a new token usage record
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Add another token usage to this one
    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Structured research result from a single agent
///
/// Immutable once built; the orchestrator owns it inside the response map
/// until the aggregator consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResponse {
    /// The original research question
    pub query: String,
    /// The model's research findings; never empty after parsing
    pub answer: String,
    /// Domain the query was researched under
    pub domain: ResearchDomain,
    /// Self-reported confidence
    pub confidence: ConfidenceLevel,
    /// Main takeaways, at most five
    #[serde(default)]
    pub key_points: Vec<String>,
    /// URLs or references, when the model provided any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    /// Model that produced this response; map key throughout the pipeline
    pub model_name: String,
    /// When the research was conducted
    pub timestamp: DateTime<Utc>,
    /// Tokens consumed by the request, when the provider reported them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
}

/// Aggregated comparison across all council agents
///
/// Terminal artifact of a research run. Invariant:
/// `successful_agents + failed_agents.len() == total_agents`, and the keys
/// of `responses` are exactly the successful subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// The research question asked
    pub query: String,
    /// Research domain
    pub domain: ResearchDomain,
    /// Successful responses keyed by model name
    pub responses: HashMap<String, ResearchResponse>,
    /// Number of agents queried
    pub total_agents: usize,
    /// Number of agents that responded successfully
    pub successful_agents: usize,
    /// Models with no successful result
    #[serde(default)]
    pub failed_agents: Vec<String>,
    /// Key points recurring across at least two models
    #[serde(default)]
    pub consensus_points: Vec<String>,
    /// Points where models diverge
    #[serde(default)]
    pub disagreement_points: Vec<String>,
    /// Single confidence label, or a "low to high" style span
    pub confidence_range: String,
    /// Unified answer produced by the selected synthesis strategy
    pub synthesized_answer: String,
    /// Reasoning summary from the master synthesis call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_trace: Option<String>,
    /// Areas the models lacked information on (master synthesis only)
    #[serde(default)]
    pub knowledge_gaps: Vec<String>,
    /// Claims flagged for fact-checking (master synthesis only)
    #[serde(default)]
    pub verification_needed: Vec<String>,
    /// Why the confidence level was assigned (master synthesis only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_reasoning: Option<String>,
    /// Tokens used across all models, synthesis call included
    pub total_tokens: u64,
    /// Estimated cost in USD
    pub total_cost: f64,
    /// When the council research was conducted
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_rank_round_trip() {
        for level in [
            ConfidenceLevel::Low,
            ConfidenceLevel::Medium,
            ConfidenceLevel::High,
            ConfidenceLevel::VeryHigh,
        ] {
            assert_eq!(ConfidenceLevel::from_rank(level.rank()), level);
        }
    }

    #[test]
    fn test_confidence_parse_accepts_spaces() {
        assert_eq!(
            ConfidenceLevel::parse("very high"),
            Some(ConfidenceLevel::VeryHigh)
        );
        assert_eq!(ConfidenceLevel::parse("Medium"), Some(ConfidenceLevel::Medium));
        assert_eq!(ConfidenceLevel::parse("certain"), None);
    }

    #[test]
    fn test_token_usage_add() {
        let mut usage = TokenUsage::new(100, 50);
        usage.add(TokenUsage::new(10, 5));
        assert_eq!(usage.prompt_tokens, 110);
        assert_eq!(usage.completion_tokens, 55);
        assert_eq!(usage.total_tokens, 165);
    }

    #[test]
    fn test_domain_serialized_lowercase() {
        let json = serde_json::to_string(&ResearchDomain::Healthcare).unwrap();
        assert_eq!(json, "\"healthcare\"");
    }
}
