//! Response aggregator - reduction of an outcome map to one comparison
//!
//! The aggregator never raises on agent-level failures; those were already
//! isolated by the orchestrator and arrive as absent map entries. Zero
//! successes is a representable terminal state, not an error. Only the
//! optional master-synthesis call can fail the aggregation as a whole.

use crate::config::PriceTable;
use crate::council::orchestrator::ResponseMap;
use crate::council::synthesizer::MasterSynthesizer;
use crate::error::Result;
use crate::types::{ComparisonResult, ConfidenceLevel, ResearchDomain, ResearchResponse};
use chrono::Utc;
use std::collections::HashMap;

/// Fixed answer used when no agent produced a result
pub(crate) const ALL_FAILED_ANSWER: &str = "All agents failed to respond.";

enum Strategy {
    RuleBased,
    Master(MasterSynthesizer),
}

/// Aggregates and compares responses from multiple research agents
///
/// The synthesis strategy is fixed at construction: rule-based reduction
/// (deterministic, no network) or delegation to a master reasoning model.
/// Strategy selection happens before aggregation begins - a failing master
/// call is never silently downgraded mid-flight.
pub struct ResponseAggregator {
    strategy: Strategy,
    pricing: PriceTable,
}

impl ResponseAggregator {
    /// Create a rule-based aggregator with default worker pricing
    pub fn rule_based() -> Self {
        Self {
            strategy: Strategy::RuleBased,
            pricing: PriceTable::default(),
        }
    }

    /// Create an aggregator that delegates synthesis to a reasoning model
    pub fn with_master(synthesizer: MasterSynthesizer) -> Self {
        Self {
            strategy: Strategy::Master(synthesizer),
            pricing: PriceTable::default(),
        }
    }

    /// Replace the worker price table
    pub fn with_pricing(mut self, pricing: PriceTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Aggregate an outcome map into a comparison result
    ///
    /// Async because master synthesis issues one further remote call; the
    /// rule-based path never errors.
    pub async fn aggregate(
        &self,
        responses: &ResponseMap,
        query: &str,
        domain: ResearchDomain,
    ) -> Result<ComparisonResult> {
        match &self.strategy {
            Strategy::RuleBased => Ok(self.aggregate_rule_based(responses, query, domain)),
            Strategy::Master(synthesizer) => {
                let (successes, _) = partition(responses);
                if successes.is_empty() {
                    return Ok(failure_result(responses, query, domain));
                }
                synthesizer
                    .synthesize(query, responses, domain, &self.pricing)
                    .await
            }
        }
    }

    fn aggregate_rule_based(
        &self,
        responses: &ResponseMap,
        query: &str,
        domain: ResearchDomain,
    ) -> ComparisonResult {
        let (successes, failed_agents) = partition(responses);

        if successes.is_empty() {
            return failure_result(responses, query, domain);
        }

        tracing::info!(
            successful = successes.len(),
            failed = failed_agents.len(),
            "aggregating responses"
        );

        let consensus_points = find_consensus(&successes);
        let disagreement_points = find_disagreements(&successes);
        let confidence_range = confidence_range(&successes);
        let synthesized_answer = synthesize_answer(&successes, &consensus_points);
        let total_tokens = total_tokens(&successes);
        let total_cost = self.total_cost(&successes);

        tracing::debug!(
            consensus = consensus_points.len(),
            disagreements = disagreement_points.len(),
            %confidence_range,
            total_tokens,
            total_cost,
            "rule-based analysis complete"
        );

        ComparisonResult {
            query: query.to_string(),
            domain,
            responses: successes
                .iter()
                .map(|(name, response)| (name.clone(), (*response).clone()))
                .collect(),
            total_agents: responses.len(),
            successful_agents: successes.len(),
            failed_agents,
            consensus_points,
            disagreement_points,
            confidence_range,
            synthesized_answer,
            reasoning_trace: None,
            knowledge_gaps: vec![],
            verification_needed: vec![],
            confidence_reasoning: None,
            total_tokens,
            total_cost,
            timestamp: Utc::now(),
        }
    }

    fn total_cost(&self, successes: &[(String, &ResearchResponse)]) -> f64 {
        successes
            .iter()
            .map(|(name, response)| {
                self.pricing.cost(name, response.tokens_used.unwrap_or(0))
            })
            .sum()
    }
}

/// Split the outcome map into successes (sorted by model name, so every
/// derived ordering is deterministic) and failed model names
pub(crate) fn partition(responses: &ResponseMap) -> (Vec<(String, &ResearchResponse)>, Vec<String>) {
    let mut successes: Vec<(String, &ResearchResponse)> = Vec::new();
    let mut failed: Vec<String> = Vec::new();

    for (name, outcome) in responses {
        match outcome {
            Some(response) => successes.push((name.clone(), response)),
            None => failed.push(name.clone()),
        }
    }

    successes.sort_by(|a, b| a.0.cmp(&b.0));
    failed.sort();
    (successes, failed)
}

/// Fully-formed result describing total failure; shared by both strategies
pub(crate) fn failure_result(
    responses: &ResponseMap,
    query: &str,
    domain: ResearchDomain,
) -> ComparisonResult {
    let mut failed_agents: Vec<String> = responses.keys().cloned().collect();
    failed_agents.sort();

    ComparisonResult {
        query: query.to_string(),
        domain,
        responses: HashMap::new(),
        total_agents: responses.len(),
        successful_agents: 0,
        failed_agents,
        consensus_points: vec![],
        disagreement_points: vec![],
        confidence_range: "low".to_string(),
        synthesized_answer: ALL_FAILED_ANSWER.to_string(),
        reasoning_trace: None,
        knowledge_gaps: vec![],
        verification_needed: vec![],
        confidence_reasoning: None,
        total_tokens: 0,
        total_cost: 0.0,
        timestamp: Utc::now(),
    }
}

/// Sum of worker tokens, treating unreported usage as zero
pub(crate) fn total_tokens(successes: &[(String, &ResearchResponse)]) -> u64 {
    successes
        .iter()
        .map(|(_, response)| response.tokens_used.unwrap_or(0))
        .sum()
}

/// Key points whose literal text recurs in at least two agents' lists
///
/// Counting preserves first-seen order; output capped at five points.
/// Exact string equality is a documented simplification - differently
/// worded but semantically identical points do not match.
fn find_consensus(successes: &[(String, &ResearchResponse)]) -> Vec<String> {
    if successes.len() < 2 {
        return vec![];
    }

    let mut counts: Vec<(String, usize)> = Vec::new();
    for (_, response) in successes {
        for point in &response.key_points {
            match counts.iter_mut().find(|(text, _)| text == point) {
                Some((_, count)) => *count += 1,
                None => counts.push((point.clone(), 1)),
            }
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(text, _)| text)
        .take(5)
        .collect()
}

/// The two disagreement signals: varying confidence levels and a large
/// answer-length disparity. Nothing else is computed.
fn find_disagreements(successes: &[(String, &ResearchResponse)]) -> Vec<String> {
    if successes.len() < 2 {
        return vec![];
    }

    let mut disagreements = Vec::new();

    let all_same = successes
        .windows(2)
        .all(|pair| pair[0].1.confidence == pair[1].1.confidence);
    if !all_same {
        let listing = successes
            .iter()
            .map(|(name, response)| format!("{}: {}", name, response.confidence))
            .collect::<Vec<_>>()
            .join(", ");
        disagreements.push(format!("Confidence levels vary ({listing})"));
    }

    let lengths: Vec<usize> = successes
        .iter()
        .map(|(_, response)| response.answer.len())
        .collect();
    let max_len = *lengths.iter().max().unwrap_or(&0);
    let min_len = *lengths.iter().min().unwrap_or(&0);
    if max_len as f64 > min_len as f64 * 1.5 {
        disagreements.push(format!(
            "Response depth varies significantly (shortest: {min_len} chars, longest: {max_len} chars)"
        ));
    }

    disagreements
}

/// Single shared label verbatim, or a "min to max" span over the rank scale
fn confidence_range(successes: &[(String, &ResearchResponse)]) -> String {
    let Some((_, first)) = successes.first() else {
        return "low".to_string();
    };

    let all_same = successes
        .iter()
        .all(|(_, response)| response.confidence == first.confidence);
    if all_same {
        return first.confidence.as_str().to_string();
    }

    let min = successes
        .iter()
        .map(|(_, response)| response.confidence.rank())
        .min()
        .unwrap_or(1);
    let max = successes
        .iter()
        .map(|(_, response)| response.confidence.rank())
        .max()
        .unwrap_or(1);

    format!(
        "{} to {}",
        ConfidenceLevel::from_rank(min),
        ConfidenceLevel::from_rank(max)
    )
}

/// Rule-based unified answer: single success passes through verbatim;
/// otherwise the top consensus points plus a sentence naming contributors
fn synthesize_answer(
    successes: &[(String, &ResearchResponse)],
    consensus_points: &[String],
) -> String {
    if successes.len() == 1 {
        return successes[0].1.answer.clone();
    }

    let mut parts: Vec<String> = Vec::new();

    if !consensus_points.is_empty() {
        parts.push("Key consensus points:".to_string());
        for (i, point) in consensus_points.iter().take(3).enumerate() {
            parts.push(format!("{}. {}", i + 1, point));
        }
    }

    let models = successes
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    parts.push(format!(
        "Based on {} AI models ({}), this represents a synthesized view of their findings.",
        successes.len(),
        models
    ));

    parts.join(" ")
}
