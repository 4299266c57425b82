//! # Council
//!
//! A multi-model research council built with Rust: one query fans out to
//! several independently-hosted LLM backends in parallel, whatever subset
//! responds is collected, and the responses reduce to a single unified
//! answer plus a structured comparison of agreement and disagreement.
//!
//! ## Features
//!
//! - **Concurrent fan-out**: one task per agent, join-all barrier, no
//!   first-wins races
//! - **Graceful degradation**: a failing agent becomes an absent map entry,
//!   never a failed run
//! - **Pluggable synthesis**: deterministic rule-based reduction, or
//!   delegation to a reasoning model with structured-output parsing
//! - **Cost accounting**: per-model price tables for workers and the
//!   synthesis call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use council::council::{CouncilOrchestrator, ResponseAggregator};
//! use council::providers::{GeminiAgent, OpenAiAgent};
//! use council::types::ResearchDomain;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = CouncilOrchestrator::new(vec![
//!         Arc::new(OpenAiAgent::from_env()?),
//!         Arc::new(GeminiAgent::from_env()?),
//!     ])?;
//!
//!     let responses = orchestrator
//!         .research_all(
//!             "What are the benefits of regular exercise?",
//!             ResearchDomain::Healthcare,
//!             Some(500),
//!         )
//!         .await;
//!
//!     let result = ResponseAggregator::rule_based()
//!         .aggregate(
//!             &responses,
//!             "What are the benefits of regular exercise?",
//!             ResearchDomain::Healthcare,
//!         )
//!         .await?;
//!
//!     println!("{}", result.synthesized_answer);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod config;
pub mod council;
pub mod error;
pub mod output;
pub mod parse;
pub mod prompt;
pub mod providers;
pub mod types;

// Re-exports for convenience
pub use agent::ResearchAgent;
pub use config::{PriceTable, SynthesisPriceTable};
pub use council::{
    CouncilConfig, CouncilOrchestrator, MasterSynthesizer, ResponseAggregator, ResponseMap,
};
pub use error::{Error, Result};
pub use output::{JsonFileStore, ResultStore};
pub use types::{
    ComparisonResult, ConfidenceLevel, ResearchDomain, ResearchResponse, TokenUsage,
};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::ResearchAgent;
    pub use crate::council::{CouncilOrchestrator, ResponseAggregator, ResponseMap};
    pub use crate::error::{Error, Result};
    pub use crate::output::{JsonFileStore, ResultStore};
    pub use crate::types::*;
}
