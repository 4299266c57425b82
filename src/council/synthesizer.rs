//! Master synthesizer - delegated reasoning over agent responses
//!
//! Instead of rule-based reduction, one further call to a
//! reasoning-capable model analyzes every successful response and returns
//! a structured JSON synthesis. The call is sequential and strictly after
//! the fan-out barrier; its outright failure fails the aggregation (there
//! is no silent downgrade to the rule-based strategy mid-call).

use crate::config::{presets, PriceTable, SynthesisPriceTable};
use crate::council::aggregator::{failure_result, partition, total_tokens};
use crate::council::orchestrator::ResponseMap;
use crate::error::{Error, Result};
use crate::providers::openai::{ChatCompletionRequest, ChatMessage, OpenAiClient, OpenAiConfig};
use crate::types::{ComparisonResult, ResearchDomain, ResearchResponse, TokenUsage};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;

/// Parsed synthesis output with schema defaults for absent fields
///
/// A missing key never fails the parse; it fills with the empty value of
/// its type ("medium" for the confidence label).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ParsedSynthesis {
    #[serde(default)]
    pub consensus_points: Vec<String>,
    #[serde(default)]
    pub disagreement_points: Vec<String>,
    #[serde(default)]
    pub knowledge_gaps: Vec<String>,
    #[serde(default)]
    pub synthesized_answer: String,
    #[serde(default = "default_confidence")]
    pub confidence_range: String,
    #[serde(default)]
    pub confidence_reasoning: String,
    #[serde(default)]
    pub verification_needed: Vec<String>,
    #[serde(default)]
    pub reasoning_trace: String,
}

fn default_confidence() -> String {
    "medium".to_string()
}

/// Aggregation strategy that delegates synthesis to a reasoning model
pub struct MasterSynthesizer {
    client: OpenAiClient,
    model: String,
    pricing: SynthesisPriceTable,
}

impl MasterSynthesizer {
    /// Create a synthesizer from `OPENAI_API_KEY` with the default model
    ///
    /// The missing credential is a configuration error surfaced here, at
    /// construction - strategy selection is resolved before any
    /// aggregation begins.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?, presets::OPENAI_GPT4O)
    }

    /// Create a synthesizer with the given configuration and model
    pub fn new(config: OpenAiConfig, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: OpenAiClient::new(config)?,
            model: model.into(),
            pricing: SynthesisPriceTable::default(),
        })
    }

    /// Replace the synthesis price table
    pub fn with_pricing(mut self, pricing: SynthesisPriceTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Synthesize all successful responses into a comparison result
    ///
    /// Worker-side tokens and cost (from `worker_pricing`) are combined
    /// with this call's own usage, priced input and output independently.
    pub async fn synthesize(
        &self,
        query: &str,
        responses: &ResponseMap,
        domain: ResearchDomain,
        worker_pricing: &PriceTable,
    ) -> Result<ComparisonResult> {
        let (successes, failed_agents) = partition(responses);
        if successes.is_empty() {
            return Ok(failure_result(responses, query, domain));
        }

        tracing::info!(
            model = %self.model,
            agents = successes.len(),
            "master synthesis started"
        );

        let prompt = build_synthesis_prompt(query, &successes);
        let mut request =
            ChatCompletionRequest::new(&self.model, vec![ChatMessage::user(prompt)]);
        // Reasoning models reject sampling parameters
        if !self.model.starts_with("o1") && !self.model.starts_with("o3") {
            request = request.with_temperature(0.7).with_max_tokens(4000);
        }

        let response = self
            .client
            .complete(request)
            .await
            .map_err(|e| Error::synthesis(e.to_string()))?;

        let parsed = parse_synthesis(&response.first_content());

        let synthesis_usage = response
            .usage
            .map(|usage| TokenUsage::new(usage.prompt_tokens, usage.completion_tokens))
            .unwrap_or_default();
        let worker_tokens = total_tokens(&successes);
        let worker_cost: f64 = successes
            .iter()
            .map(|(name, response)| worker_pricing.cost(name, response.tokens_used.unwrap_or(0)))
            .sum();
        let synthesis_cost = self.pricing.cost(
            &self.model,
            synthesis_usage.prompt_tokens,
            synthesis_usage.completion_tokens,
        );

        tracing::debug!(
            consensus = parsed.consensus_points.len(),
            disagreements = parsed.disagreement_points.len(),
            gaps = parsed.knowledge_gaps.len(),
            confidence = %parsed.confidence_range,
            "master synthesis complete"
        );

        Ok(ComparisonResult {
            query: query.to_string(),
            domain,
            responses: successes
                .iter()
                .map(|(name, response)| (name.clone(), (*response).clone()))
                .collect(),
            total_agents: responses.len(),
            successful_agents: successes.len(),
            failed_agents,
            consensus_points: parsed.consensus_points,
            disagreement_points: parsed.disagreement_points,
            confidence_range: parsed.confidence_range,
            synthesized_answer: parsed.synthesized_answer,
            reasoning_trace: non_empty(parsed.reasoning_trace),
            knowledge_gaps: parsed.knowledge_gaps,
            verification_needed: parsed.verification_needed,
            confidence_reasoning: non_empty(parsed.confidence_reasoning),
            total_tokens: worker_tokens + synthesis_usage.total_tokens,
            total_cost: worker_cost + synthesis_cost,
            timestamp: Utc::now(),
        })
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Build the synthesis prompt embedding every successful response
fn build_synthesis_prompt(query: &str, successes: &[(String, &ResearchResponse)]) -> String {
    let mut parts: Vec<String> = vec![
        "# Research Synthesis Task".to_string(),
        format!("\n## Original Query\n{query}"),
        "\n## Agent Responses\n".to_string(),
    ];

    for (model_name, response) in successes {
        parts.push(format!("### {model_name}"));
        parts.push(format!("**Answer:** {}", response.answer));
        parts.push(format!("**Confidence:** {}", response.confidence));
        parts.push("**Key Points:**".to_string());
        for point in &response.key_points {
            parts.push(format!("  - {point}"));
        }
        parts.push(String::new());
    }

    parts.push(
        r#"
## Your Task

As a master research synthesizer, deeply analyze all agent responses and provide:

1. Consensus analysis: points where agents genuinely agree (semantic agreement, not just word matching), ranked by importance.
2. Disagreement analysis: meaningful disagreements, their root cause, and which perspective is more credible.
3. Knowledge gaps: areas where agents lack complete information or claims that need verification.
4. Synthesized answer: a coherent, well-reasoned synthesis integrating insights from all agents.
5. Confidence assessment: overall level (low, medium, high, or very_high) with detailed reasoning.
6. Verification needs: specific claims that need fact-checking.

## Output Format

Provide your response as a JSON object with this exact structure:

```json
{
  "consensus_points": ["First consensus point...", "Second consensus point..."],
  "disagreement_points": ["Description of disagreement..."],
  "knowledge_gaps": ["First gap in knowledge..."],
  "synthesized_answer": "Your comprehensive, well-reasoned synthesis here.",
  "confidence_range": "medium",
  "confidence_reasoning": "Why you assigned this confidence level.",
  "verification_needed": ["Specific claim that needs verification..."],
  "reasoning_trace": "Brief summary of your reasoning process."
}
```

**Important:**
- Be honest about uncertainties
- Prioritize accuracy over confidence
- Output ONLY the JSON, no additional text
"#
        .to_string(),
    );

    parts.join("\n")
}

/// Parse the reasoning model's output into a synthesis record
///
/// Three strategies in order: JSON extracted from a fenced code block,
/// whole-text JSON, and finally a degenerate plain-text record (empty
/// lists, truncated answer and trace, medium confidence). Parsing never
/// fails; degradation is logged.
pub(crate) fn parse_synthesis(text: &str) -> ParsedSynthesis {
    let fence = Regex::new(r"(?s)```json\s*\n(.*?)\n```").expect("valid fenced-json pattern");
    if let Some(captures) = fence.captures(text) {
        if let Ok(parsed) = serde_json::from_str::<ParsedSynthesis>(&captures[1]) {
            return parsed;
        }
    }

    if let Ok(parsed) = serde_json::from_str::<ParsedSynthesis>(text) {
        return parsed;
    }

    tracing::warn!("synthesis output was not valid JSON; degrading to plain-text record");
    ParsedSynthesis {
        consensus_points: vec![],
        disagreement_points: vec![],
        knowledge_gaps: vec![],
        synthesized_answer: truncate_chars(text, 1000),
        confidence_range: "medium".to_string(),
        confidence_reasoning: "Based on natural language synthesis".to_string(),
        verification_needed: vec![],
        reasoning_trace: truncate_chars(text, 500),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
