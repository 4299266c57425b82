//! Council module - concurrent fan-out and response aggregation
//!
//! A council run has two halves: the orchestrator fires every configured
//! agent at one query concurrently and collects a keyed outcome map that
//! never drops an agent; the aggregator reduces that map into a single
//! comparison artifact using the synthesis strategy selected at
//! construction time.
//!
//! # Example
//!
//! ```rust,ignore
//! use council::council::{CouncilOrchestrator, ResponseAggregator};
//!
//! let orchestrator = CouncilOrchestrator::new(agents)?;
//! let responses = orchestrator
//!     .research_all("What are the benefits of exercise?", domain, Some(500))
//!     .await;
//! let aggregator = ResponseAggregator::rule_based();
//! let result = aggregator.aggregate(&responses, query, domain).await?;
//! ```

pub mod aggregator;
pub mod config;
pub mod orchestrator;
pub mod synthesizer;

// Re-exports
pub use aggregator::ResponseAggregator;
pub use config::{AgentSpec, CouncilConfig, ProviderKind, StrategyKind};
pub use orchestrator::{CouncilOrchestrator, ResponseMap};
pub use synthesizer::MasterSynthesizer;
