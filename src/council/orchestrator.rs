//! Council orchestrator - concurrent fan-out across all agents
//!
//! Every agent runs the same query in its own task; the orchestrator waits
//! for all of them to reach a terminal state (a join-all barrier, not a
//! race) and returns a map that always carries one entry per agent. A
//! failing agent contributes an absent entry and a warning; it never
//! cancels or infects its siblings.

use crate::agent::ResearchAgent;
use crate::error::{Error, Result};
use crate::types::{ResearchDomain, ResearchResponse};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-run outcome map: every invoked agent's model name mapped to its
/// result, or `None` when the agent failed
pub type ResponseMap = HashMap<String, Option<ResearchResponse>>;

/// Concurrent fan-out orchestrator over a fixed set of research agents
pub struct CouncilOrchestrator {
    agents: Vec<Arc<dyn ResearchAgent>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for CouncilOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouncilOrchestrator")
            .field("agents", &self.agent_models())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CouncilOrchestrator {
    /// Create a new orchestrator
    ///
    /// Fails with a configuration error when no agents are supplied -
    /// "no agents available" is an expected condition, surfaced before any
    /// research starts.
    pub fn new(agents: Vec<Arc<dyn ResearchAgent>>) -> Result<Self> {
        if agents.is_empty() {
            return Err(Error::config("council must have at least one agent"));
        }

        tracing::info!(agent_count = agents.len(), "council orchestrator initialized");
        for agent in &agents {
            tracing::debug!(model = agent.model_name(), "council member");
        }

        Ok(Self {
            agents,
            timeout: None,
        })
    }

    /// Bound each agent call with a per-agent timeout
    ///
    /// Off by default: without it a hung provider call blocks the join-all
    /// indefinitely. A timed-out agent is recorded as a failed entry, so
    /// the barrier still aggregates whatever subset completed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of agents in this council
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Model names of the council members, in configuration order
    pub fn agent_models(&self) -> Vec<String> {
        self.agents
            .iter()
            .map(|agent| agent.model_name().to_string())
            .collect()
    }

    /// Run the query through all agents in parallel
    ///
    /// The returned map has exactly one key per agent regardless of how
    /// many fail; it is the only channel carrying failure information to
    /// the aggregator.
    pub async fn research_all(
        &self,
        query: &str,
        domain: ResearchDomain,
        max_tokens: Option<u32>,
    ) -> ResponseMap {
        tracing::info!(
            query,
            domain = %domain,
            agents = self.agents.len(),
            "council research session started"
        );
        let start = Instant::now();

        let futures: Vec<_> = self
            .agents
            .iter()
            .map(|agent| {
                let agent = Arc::clone(agent);
                async move {
                    let agent_start = Instant::now();
                    let result = self.run_agent(&agent, query, domain, max_tokens).await;
                    (
                        agent.model_name().to_string(),
                        result,
                        agent_start.elapsed(),
                    )
                }
            })
            .collect();

        let results = join_all(futures).await;

        let mut responses: ResponseMap = HashMap::with_capacity(self.agents.len());
        for (model_name, result, elapsed) in results {
            match result {
                Ok(response) => {
                    tracing::info!(
                        model = %model_name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        tokens = response.tokens_used,
                        "agent completed"
                    );
                    responses.insert(model_name, Some(response));
                }
                Err(e) => {
                    tracing::warn!(
                        model = %model_name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %e,
                        "agent failed"
                    );
                    responses.insert(model_name, None);
                }
            }
        }

        let successful = responses.values().filter(|r| r.is_some()).count();
        tracing::info!(
            successful,
            failed = responses.len() - successful,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "council research session complete"
        );

        responses
    }

    async fn run_agent(
        &self,
        agent: &Arc<dyn ResearchAgent>,
        query: &str,
        domain: ResearchDomain,
        max_tokens: Option<u32>,
    ) -> Result<ResearchResponse> {
        match self.timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, agent.research(query, domain, max_tokens)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::agent(
                        agent.model_name(),
                        format!("timed out after {}s", timeout.as_secs()),
                    )),
                }
            }
            None => agent.research(query, domain, max_tokens).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfidenceLevel;
    use async_trait::async_trait;
    use chrono::Utc;

    /// Scripted agent for orchestration tests
    pub(crate) struct ScriptedAgent {
        pub name: String,
        pub outcome: std::result::Result<String, String>,
        pub delay: Option<Duration>,
    }

    impl ScriptedAgent {
        pub fn succeeding(name: &str, answer: &str) -> Arc<dyn ResearchAgent> {
            Arc::new(Self {
                name: name.to_string(),
                outcome: Ok(answer.to_string()),
                delay: None,
            })
        }

        pub fn failing(name: &str, message: &str) -> Arc<dyn ResearchAgent> {
            Arc::new(Self {
                name: name.to_string(),
                outcome: Err(message.to_string()),
                delay: None,
            })
        }

        pub fn hanging(name: &str, delay: Duration) -> Arc<dyn ResearchAgent> {
            Arc::new(Self {
                name: name.to_string(),
                outcome: Ok("slow answer".to_string()),
                delay: Some(delay),
            })
        }
    }

    #[async_trait]
    impl ResearchAgent for ScriptedAgent {
        fn model_name(&self) -> &str {
            &self.name
        }

        async fn research(
            &self,
            query: &str,
            domain: ResearchDomain,
            _max_tokens: Option<u32>,
        ) -> Result<ResearchResponse> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.outcome {
                Ok(answer) => Ok(ResearchResponse {
                    query: query.to_string(),
                    answer: answer.clone(),
                    domain,
                    confidence: ConfidenceLevel::High,
                    key_points: vec![],
                    sources: None,
                    model_name: self.name.clone(),
                    timestamp: Utc::now(),
                    tokens_used: Some(100),
                }),
                Err(message) => Err(Error::agent(&self.name, message.clone())),
            }
        }
    }

    #[test]
    fn test_empty_council_is_a_configuration_error() {
        let err = CouncilOrchestrator::new(vec![]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_map_has_one_key_per_agent_despite_failures() {
        let orchestrator = CouncilOrchestrator::new(vec![
            ScriptedAgent::succeeding("model-a", "answer a"),
            ScriptedAgent::failing("model-b", "connection refused"),
            ScriptedAgent::failing("model-c", "401 unauthorized"),
        ])
        .unwrap();

        let responses = orchestrator
            .research_all("query", ResearchDomain::Finance, None)
            .await;

        assert_eq!(responses.len(), 3);
        assert!(responses["model-a"].is_some());
        assert!(responses["model-b"].is_none());
        assert!(responses["model-c"].is_none());
    }

    #[tokio::test]
    async fn test_failure_isolation_leaves_sibling_untouched() {
        let orchestrator = CouncilOrchestrator::new(vec![
            ScriptedAgent::failing("model-a", "boom"),
            ScriptedAgent::succeeding("model-b", "still here"),
        ])
        .unwrap();

        let responses = orchestrator
            .research_all("query", ResearchDomain::Sports, None)
            .await;

        let survivor = responses["model-b"].as_ref().unwrap();
        assert_eq!(survivor.answer, "still here");
        assert_eq!(survivor.model_name, "model-b");
    }

    #[tokio::test]
    async fn test_timed_out_agent_becomes_failed_entry() {
        let orchestrator = CouncilOrchestrator::new(vec![
            ScriptedAgent::hanging("model-slow", Duration::from_secs(30)),
            ScriptedAgent::succeeding("model-fast", "quick answer"),
        ])
        .unwrap()
        .with_timeout(Duration::from_millis(50));

        let responses = orchestrator
            .research_all("query", ResearchDomain::Shopping, None)
            .await;

        assert_eq!(responses.len(), 2);
        assert!(responses["model-slow"].is_none());
        assert!(responses["model-fast"].is_some());
    }

    #[tokio::test]
    async fn test_all_agents_see_the_same_query() {
        let orchestrator = CouncilOrchestrator::new(vec![
            ScriptedAgent::succeeding("model-a", "a"),
            ScriptedAgent::succeeding("model-b", "b"),
        ])
        .unwrap();

        let responses = orchestrator
            .research_all("shared question", ResearchDomain::Healthcare, Some(500))
            .await;

        for response in responses.values().flatten() {
            assert_eq!(response.query, "shared question");
        }
    }
}
