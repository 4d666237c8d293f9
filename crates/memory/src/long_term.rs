//! Long-term memory gateway — namespace-scoped access to the external store.
//!
//! Wraps a [`MemoryStore`] together with the session's fixed user namespace.
//! Retrieval and write are deliberately decoupled: a write must never block
//! the turn that produced it, because embedding and indexing latency is
//! unbounded relative to generation latency. Writes go through
//! [`crate::MemoryWriter`]; the gateway itself stays safe for concurrent
//! `search` and `add` (consistency is delegated to the store).

use echomind_core::error::MemoryError;
use echomind_core::memory::{MemoryHit, MemoryStore};
use std::sync::Arc;
use tracing::debug;

/// Rendered when a search returned no results.
pub const NO_RESULTS_SENTINEL: &str = "no related long-term memory.";

/// Rendered when the search itself failed. Distinct from "no results" so the
/// model (and the logs) can tell an empty memory from a broken store.
pub const UNAVAILABLE_SENTINEL: &str = "long-term memory unavailable.";

/// Namespace-scoped gateway to the external semantic store.
pub struct LongTermMemory {
    store: Arc<dyn MemoryStore>,
    user_id: String,
}

impl LongTermMemory {
    pub fn new(store: Arc<dyn MemoryStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    /// The wrapped store's name, for diagnostics.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// The fixed namespace this gateway writes and reads.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Similarity search in the session namespace. Tolerates any query,
    /// including empty. Errors are returned, not swallowed — the caller
    /// decides to degrade (the orchestrator substitutes
    /// [`UNAVAILABLE_SENTINEL`] and proceeds).
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryHit>, MemoryError> {
        let hits = self.store.search(query, &self.user_id, limit).await?;
        debug!(target: "ltm", count = hits.len(), "Long-term memory search complete");
        Ok(hits)
    }

    /// Durable write into the session namespace.
    pub async fn add(&self, text: &str) -> Result<(), MemoryError> {
        self.store.add(text, &self.user_id).await
    }

    /// Administrative bulk delete of the namespace. Never called during
    /// normal turn processing.
    pub async fn reset(&self) -> Result<(), MemoryError> {
        self.store.reset(&self.user_id).await
    }

    pub async fn health_check(&self) -> Result<(), MemoryError> {
        self.store.health_check().await
    }

    /// Render search results for prompt injection: one line per hit, scores
    /// to two decimals, `N/A` when the store omitted the score.
    pub fn render(results: &[MemoryHit]) -> String {
        if results.is_empty() {
            return NO_RESULTS_SENTINEL.to_string();
        }

        let mut out = String::new();
        for (i, hit) in results.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match hit.score {
                Some(score) => {
                    out.push_str(&format!("- {} (relevance: {:.2})", hit.memory, score));
                }
                None => {
                    out.push_str(&format!("- {} (relevance: N/A)", hit.memory));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;

    fn hit(memory: &str, score: Option<f32>) -> MemoryHit {
        MemoryHit {
            memory: memory.into(),
            score,
        }
    }

    #[test]
    fn render_empty_is_the_sentinel() {
        assert_eq!(LongTermMemory::render(&[]), NO_RESULTS_SENTINEL);
    }

    #[test]
    fn render_formats_scores_to_two_decimals() {
        let rendered = LongTermMemory::render(&[
            hit("User likes astronomy", Some(0.8751)),
            hit("User has a cat named Mochi", Some(0.5)),
        ]);
        assert_eq!(
            rendered,
            "- User likes astronomy (relevance: 0.88)\n\
             - User has a cat named Mochi (relevance: 0.50)"
        );
    }

    #[test]
    fn render_missing_score_is_na() {
        let rendered = LongTermMemory::render(&[hit("an unscored memory", None)]);
        assert_eq!(rendered, "- an unscored memory (relevance: N/A)");
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(NO_RESULTS_SENTINEL, UNAVAILABLE_SENTINEL);
    }

    #[tokio::test]
    async fn gateway_scopes_to_its_namespace() {
        let store = Arc::new(InMemoryStore::new());
        let ltm = LongTermMemory::new(store.clone(), "default_user");

        ltm.add("User: hi\nAssistant: hello").await.unwrap();
        store.add("other namespace fact", "someone_else").await.unwrap();

        let hits = ltm.search("hello", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].memory.contains("hello"));
    }

    #[tokio::test]
    async fn empty_query_is_tolerated() {
        let store = Arc::new(InMemoryStore::new());
        let ltm = LongTermMemory::new(store, "default_user");
        ltm.add("something remembered").await.unwrap();

        let hits = ltm.search("", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn reset_empties_only_this_namespace() {
        let store = Arc::new(InMemoryStore::new());
        let ltm = LongTermMemory::new(store.clone(), "default_user");
        ltm.add("to be forgotten").await.unwrap();
        store.add("kept", "someone_else").await.unwrap();

        ltm.reset().await.unwrap();
        assert!(ltm.search("forgotten", 10).await.unwrap().is_empty());
        assert_eq!(store.search("kept", "someone_else", 10).await.unwrap().len(), 1);
    }
}
