//! Full council run: fan out a query to every available provider,
//! aggregate, and save the comparison to disk
//!
//! Requires OPENAI_API_KEY and/or GEMINI_API_KEY; the Ollama agent joins
//! only when a local server is reachable.

use council::council::{CouncilOrchestrator, ResponseAggregator};
use council::providers::{GeminiAgent, OllamaAgent, OpenAiAgent};
use council::{JsonFileStore, ResearchAgent, ResearchDomain, ResultStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("=== Council Research Example ===\n");

    // Assemble the council from whatever credentials are available
    let mut agents: Vec<Arc<dyn ResearchAgent>> = Vec::new();

    match OpenAiAgent::from_env() {
        Ok(agent) => {
            println!("✓ OpenAI agent ({})", agent.model_name());
            agents.push(Arc::new(agent));
        }
        Err(e) => println!("- OpenAI agent skipped: {e}"),
    }

    match GeminiAgent::from_env() {
        Ok(agent) => {
            println!("✓ Gemini agent ({})", agent.model_name());
            agents.push(Arc::new(agent));
        }
        Err(e) => println!("- Gemini agent skipped: {e}"),
    }

    if let Ok(agent) = OllamaAgent::from_env() {
        if agent.is_available().await {
            println!("✓ Ollama agent ({})", agent.model_name());
            agents.push(Arc::new(agent));
        } else {
            println!("- Ollama agent skipped (no local server)");
        }
    }

    let query = "What are the key benefits of regular exercise?";
    let domain = ResearchDomain::Healthcare;

    let orchestrator = CouncilOrchestrator::new(agents)?;
    println!(
        "\nResearching with {} agents: {:?}\n",
        orchestrator.agent_count(),
        orchestrator.agent_models()
    );

    let responses = orchestrator.research_all(query, domain, Some(500)).await;

    let result = ResponseAggregator::rule_based()
        .aggregate(&responses, query, domain)
        .await?;

    println!("Successful agents: {}/{}", result.successful_agents, result.total_agents);
    if !result.failed_agents.is_empty() {
        println!("Failed agents: {:?}", result.failed_agents);
    }
    println!("\nConsensus points:");
    for point in &result.consensus_points {
        println!("  • {point}");
    }
    println!("\nConfidence range: {}", result.confidence_range);
    println!("\nSynthesized answer:\n{}", result.synthesized_answer);
    println!("\nTotal tokens: {}", result.total_tokens);
    println!("Total cost: ${:.6}", result.total_cost);

    // Persist the comparison
    let store = JsonFileStore::new("outputs");
    let path = store.save_comparison(&result).await?;
    println!("\nSaved to {}", path.display());

    Ok(())
}
