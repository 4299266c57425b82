//! Rule-based aggregation over canned responses - no API keys needed
//!
//! Demonstrates the consensus/disagreement analysis and cost accounting
//! without any network calls.

use chrono::Utc;
use council::council::{ResponseAggregator, ResponseMap};
use council::{ConfidenceLevel, PriceTable, ResearchDomain, ResearchResponse};

fn canned(
    model: &str,
    answer: &str,
    confidence: ConfidenceLevel,
    key_points: &[&str],
    tokens: u64,
) -> ResearchResponse {
    ResearchResponse {
        query: "What are the benefits of exercise?".to_string(),
        answer: answer.to_string(),
        domain: ResearchDomain::Healthcare,
        confidence,
        key_points: key_points.iter().map(|s| s.to_string()).collect(),
        sources: None,
        model_name: model.to_string(),
        timestamp: Utc::now(),
        tokens_used: Some(tokens),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Rule-Based Aggregation Example ===\n");

    let mut responses = ResponseMap::new();
    responses.insert(
        "gpt-4o".to_string(),
        Some(canned(
            "gpt-4o",
            "Regular exercise improves cardiovascular health, boosts mood, and enhances \
             overall fitness.",
            ConfidenceLevel::High,
            &[
                "Improves cardiovascular health",
                "Boosts mood and mental health",
                "Enhances physical fitness",
            ],
            500,
        )),
    );
    responses.insert(
        "gemini-2.5-flash".to_string(),
        Some(canned(
            "gemini-2.5-flash",
            "Exercise has numerous benefits including better heart health, improved mood, \
             weight management, and increased energy levels.",
            ConfidenceLevel::VeryHigh,
            &[
                "Improves cardiovascular health",
                "Improved mood",
                "Weight management",
            ],
            450,
        )),
    );
    // A third agent that never answered
    responses.insert("deepseek-r1:14b".to_string(), None);

    let result = ResponseAggregator::rule_based()
        .with_pricing(PriceTable::default())
        .aggregate(
            &responses,
            "What are the benefits of exercise?",
            ResearchDomain::Healthcare,
        )
        .await?;

    println!("Query: {}", result.query);
    println!(
        "Successful agents: {}/{}",
        result.successful_agents, result.total_agents
    );
    println!("Failed agents: {:?}", result.failed_agents);
    println!("\nConsensus points:");
    for point in &result.consensus_points {
        println!("  • {point}");
    }
    println!("\nDisagreement points:");
    for point in &result.disagreement_points {
        println!("  • {point}");
    }
    println!("\nConfidence range: {}", result.confidence_range);
    println!("\nSynthesized answer:\n  {}", result.synthesized_answer);
    println!("\nTotal tokens: {}", result.total_tokens);
    println!("Total cost: ${:.6}", result.total_cost);

    Ok(())
}
