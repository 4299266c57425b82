//! Research agent capability trait
//!
//! Every provider backend is a variant satisfying this interface, selected
//! at construction time from configuration. Agents are stateless across
//! queries, own their network client exclusively, and never retry - the
//! orchestrator decides what a failure means.

use crate::error::{Error, Result};
use crate::types::{ResearchDomain, ResearchResponse};
use async_trait::async_trait;

/// A unit wrapping one remote LLM provider
///
/// Implementations must be invocable concurrently and independently from
/// other agents: no shared mutable state, one suspension point (the remote
/// call), and a fully-built [`ResearchResponse`] or an error - never a
/// partial result.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    /// Stable model name, unique across a council run; the map key
    /// throughout the pipeline
    fn model_name(&self) -> &str;

    /// Research a query and return structured findings
    ///
    /// `max_tokens`, when given, is passed through to the provider as a
    /// completion bound.
    async fn research(
        &self,
        query: &str,
        domain: ResearchDomain,
        max_tokens: Option<u32>,
    ) -> Result<ResearchResponse>;
}

/// Reject empty queries before any network traffic
pub(crate) fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::invalid_input("query must not be empty"));
    }
    Ok(())
}
