//! Memory store trait — the abstraction over the external semantic store.
//!
//! The long-term store indexes text by meaning and returns similarity-ranked
//! results. Indexing and embedding happen inside the store; this core is a
//! consumer only. All writes are append-only from the core's perspective —
//! `reset` is an administrative bulk delete, never part of turn processing.
//!
//! Implementations: REST sidecar client, in-memory (for testing and
//! store-less sessions).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// A single retrieval result, ranked by the store's similarity metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    /// The stored memory text.
    pub memory: String,

    /// Relevance score, descending across a result set. Some stores omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// The external long-term memory store.
///
/// The store client must support concurrent `search` and `add` calls without
/// external locking — consistency is the store's responsibility. A write from
/// one turn may not yet be retrievable by the next turn's search; that
/// consistency window is accepted.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "rest", "in_memory").
    fn name(&self) -> &str;

    /// Durably add a memory to the given namespace.
    async fn add(&self, text: &str, user_id: &str) -> std::result::Result<(), MemoryError>;

    /// Similarity search within the given namespace, ranked descending.
    /// Must tolerate a query of any length, including empty.
    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<MemoryHit>, MemoryError>;

    /// Administrative bulk delete of the namespace.
    async fn reset(&self, user_id: &str) -> std::result::Result<(), MemoryError>;

    /// Health check — can we reach the store?
    async fn health_check(&self) -> std::result::Result<(), MemoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_serialization_with_score() {
        let hit = MemoryHit {
            memory: "User prefers tea over coffee".into(),
            score: Some(0.91),
        };
        let json = serde_json::to_string(&hit).unwrap();
        assert!(json.contains("tea over coffee"));
        assert!(json.contains("0.91"));
    }

    #[test]
    fn hit_score_is_optional_on_the_wire() {
        let hit: MemoryHit = serde_json::from_str(r#"{"memory":"a fact"}"#).unwrap();
        assert_eq!(hit.memory, "a fact");
        assert!(hit.score.is_none());
    }
}
