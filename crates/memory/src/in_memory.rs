//! In-memory store — useful for testing and store-less sessions.
//!
//! Ranks by a simple keyword-occurrence score instead of semantic
//! similarity; good enough to exercise the retrieval path without the
//! external sidecar.

use async_trait::async_trait;
use echomind_core::error::MemoryError;
use echomind_core::memory::{MemoryHit, MemoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

struct Entry {
    text: String,
    user_id: String,
}

/// A process-local memory store backed by a Vec.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Total stored entries across all namespaces (diagnostics/tests).
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn add(&self, text: &str, user_id: &str) -> Result<(), MemoryError> {
        self.entries.write().await.push(Entry {
            text: text.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        let entries = self.entries.read().await;
        let query_lower = query.to_lowercase();

        let mut results: Vec<MemoryHit> = entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| query_lower.is_empty() || e.text.to_lowercase().contains(&query_lower))
            .map(|e| {
                // Simple keyword relevance score.
                let score = if query_lower.is_empty() {
                    0.0
                } else {
                    let occurrences = e.text.to_lowercase().matches(&query_lower).count();
                    occurrences as f32 / (e.text.len() as f32 / 100.0).max(1.0)
                };
                MemoryHit {
                    memory: e.text.clone(),
                    score: Some(score),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn reset(&self, user_id: &str) -> Result<(), MemoryError> {
        self.entries.write().await.retain(|e| e.user_id != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_search() {
        let store = InMemoryStore::new();
        store.add("Rust is a systems language", "u1").await.unwrap();
        store.add("Python is for scripting", "u1").await.unwrap();

        let results = store.search("rust", "u1", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].memory.contains("Rust"));
        assert!(results[0].score.is_some());
    }

    #[tokio::test]
    async fn search_is_namespace_scoped() {
        let store = InMemoryStore::new();
        store.add("shared word: comet", "u1").await.unwrap();
        store.add("shared word: comet", "u2").await.unwrap();

        let results = store.search("comet", "u1", 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn results_ranked_descending() {
        let store = InMemoryStore::new();
        store.add("cat", "u1").await.unwrap();
        store.add("cat cat cat", "u1").await.unwrap();

        let results = store.search("cat", "u1", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].memory, "cat cat cat");
    }

    #[tokio::test]
    async fn limit_respected() {
        let store = InMemoryStore::new();
        for i in 0..10 {
            store.add(&format!("memory {i}"), "u1").await.unwrap();
        }
        let results = store.search("memory", "u1", 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn empty_query_returns_everything() {
        let store = InMemoryStore::new();
        store.add("alpha", "u1").await.unwrap();
        store.add("beta", "u1").await.unwrap();

        let results = store.search("", "u1", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn reset_clears_namespace() {
        let store = InMemoryStore::new();
        store.add("gone", "u1").await.unwrap();
        store.add("stays", "u2").await.unwrap();

        store.reset("u1").await.unwrap();
        assert!(store.search("gone", "u1", 10).await.unwrap().is_empty());
        assert_eq!(store.count().await, 1);
    }
}
