//! Research output persistence
//!
//! The core hands a fully-built artifact to a store and records the opaque
//! locator it gets back; it never reads the artifact again. The provided
//! backend writes pretty-printed JSON files into a per-domain directory
//! tree with timestamped, query-derived filenames.

use crate::error::{Error, Result};
use crate::types::{ComparisonResult, ResearchResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maximum length of the query fragment in generated filenames
const MAX_QUERY_SLUG: usize = 50;

/// Store-artifact-return-locator contract for research outputs
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a single agent's research response, returning its locator
    async fn save_research(&self, research: &ResearchResponse) -> Result<PathBuf>;

    /// Persist a council comparison result, returning its locator
    async fn save_comparison(&self, comparison: &ComparisonResult) -> Result<PathBuf>;
}

/// JSON-file store with per-domain subdirectories
///
/// Layout under the base directory:
///
/// ```text
/// outputs/
/// ├── sports/ finance/ shopping/ healthcare/   (single responses)
/// └── council_comparisons/<domain>/            (comparison results)
/// ```
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given directory
    ///
    /// Directories are created lazily on first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Base directory of this store
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn write_json<T: Serialize + Sync>(&self, dir: PathBuf, filename: String, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::storage(format!("Failed to create {}: {e}", dir.display())))?;

        let path = dir.join(filename);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .await
            .map_err(|e| Error::storage(format!("Failed to write {}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), "research output saved");
        Ok(path)
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn save_research(&self, research: &ResearchResponse) -> Result<PathBuf> {
        let dir = self.base_dir.join(research.domain.as_str());
        let filename = generate_filename(&research.query, research.timestamp);
        self.write_json(dir, filename, research).await
    }

    async fn save_comparison(&self, comparison: &ComparisonResult) -> Result<PathBuf> {
        let dir = self
            .base_dir
            .join("council_comparisons")
            .join(comparison.domain.as_str());
        let filename = generate_filename(&comparison.query, comparison.timestamp);
        self.write_json(dir, filename, comparison).await
    }
}

/// `{timestamp}_{sanitized_query}.json`, e.g.
/// `2024-12-14_12-30-45_what_are_best_smartphones.json`
fn generate_filename(query: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}_{}.json",
        timestamp.format("%Y-%m-%d_%H-%M-%S"),
        sanitize_query(query)
    )
}

/// Lowercased query with runs of non-alphanumerics collapsed to single
/// underscores, truncated to a filesystem-friendly length
fn sanitize_query(query: &str) -> String {
    let mut slug = String::new();
    let mut last_was_separator = true;
    for c in query.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_separator = false;
        } else if !last_was_separator {
            slug.push('_');
            last_was_separator = true;
        }
        if slug.len() >= MAX_QUERY_SLUG {
            break;
        }
    }
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfidenceLevel, ResearchDomain};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn sample_response() -> ResearchResponse {
        ResearchResponse {
            query: "What are the best smartphones?".to_string(),
            answer: "Depends on the budget.".to_string(),
            domain: ResearchDomain::Shopping,
            confidence: ConfidenceLevel::Medium,
            key_points: vec!["Budget matters".to_string()],
            sources: None,
            model_name: "gpt-4o".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 12, 14, 12, 30, 45).unwrap(),
            tokens_used: Some(200),
        }
    }

    #[test]
    fn test_filename_matches_expected_shape() {
        let timestamp = Utc.with_ymd_and_hms(2024, 12, 14, 12, 30, 45).unwrap();
        assert_eq!(
            generate_filename("What are best smartphones?", timestamp),
            "2024-12-14_12-30-45_what_are_best_smartphones.json"
        );
    }

    #[test]
    fn test_sanitize_collapses_and_truncates() {
        assert_eq!(sanitize_query("Is it -- really?! safe"), "is_it_really_safe");
        let long = "word ".repeat(30);
        assert!(sanitize_query(&long).len() <= MAX_QUERY_SLUG);
    }

    #[tokio::test]
    async fn test_save_research_writes_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let path = store.save_research(&sample_response()).await.unwrap();

        assert!(path.starts_with(dir.path().join("shopping")));
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: ResearchResponse = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.model_name, "gpt-4o");
        assert_eq!(parsed.answer, "Depends on the budget.");
    }

    #[tokio::test]
    async fn test_save_comparison_goes_under_council_comparisons() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let comparison = ComparisonResult {
            query: "q".to_string(),
            domain: ResearchDomain::Finance,
            responses: HashMap::new(),
            total_agents: 2,
            successful_agents: 0,
            failed_agents: vec!["a".to_string(), "b".to_string()],
            consensus_points: vec![],
            disagreement_points: vec![],
            confidence_range: "low".to_string(),
            synthesized_answer: "All agents failed to respond.".to_string(),
            reasoning_trace: None,
            knowledge_gaps: vec![],
            verification_needed: vec![],
            confidence_reasoning: None,
            total_tokens: 0,
            total_cost: 0.0,
            timestamp: Utc::now(),
        };

        let path = store.save_comparison(&comparison).await.unwrap();
        assert!(path.starts_with(dir.path().join("council_comparisons").join("finance")));
        assert!(tokio::fs::try_exists(&path).await.unwrap());
    }
}
