//! REST store client — speaks to a mem0-compatible memory sidecar.
//!
//! The sidecar owns the vector index, the embedder, and any internal LLM
//! use; this client only moves text and namespaces across the wire:
//!
//! - `POST {base}/configure` — push the store profile (vector-store
//!   provider, collection, path, embedding model, internal LLM); also the
//!   connectivity probe at startup
//! - `POST {base}/memories` — `{text, user_id}` durable add
//! - `POST {base}/search` — `{query, user_id, limit}` → `{results: [...]}`
//! - `DELETE {base}/memories` — `{user_id}` namespace reset

use async_trait::async_trait;
use echomind_core::error::MemoryError;
use echomind_core::memory::{MemoryHit, MemoryStore};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// What the sidecar should be configured with. Forwarded verbatim; the
/// store's own defaults apply to anything it ignores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreProfile {
    /// Vector-store provider identifier (e.g., "chroma").
    pub provider: String,

    /// Collection (namespace) name inside the vector store.
    pub collection: String,

    /// Filesystem path the store persists under.
    pub path: String,

    /// Embedding model identifier.
    pub embedding_model: String,

    /// LLM identifier for the store's internal use.
    pub llm_model: String,

    /// Base URL of the endpoint serving the embedder/LLM.
    pub llm_url: String,
}

/// A client for a mem0-compatible REST memory service.
pub struct RestMemoryStore {
    base_url: String,
    profile: StoreProfile,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl RestMemoryStore {
    pub fn new(base_url: &str, profile: StoreProfile, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
            request_timeout,
            client,
        }
    }

    /// Push the store profile to the sidecar. Doubles as the startup
    /// connectivity probe: an unreachable or misconfigured store fails here.
    pub async fn configure(&self) -> Result<(), MemoryError> {
        let url = format!("{}/configure", self.base_url);

        let body = serde_json::json!({
            "vector_store": {
                "provider": self.profile.provider.as_str(),
                "config": {
                    "collection_name": self.profile.collection.as_str(),
                    "path": self.profile.path.as_str(),
                },
            },
            "llm": {
                "provider": "ollama",
                "config": {
                    "model": self.profile.llm_model.as_str(),
                    "ollama_base_url": self.profile.llm_url.as_str(),
                },
            },
            "embedder": {
                "provider": "ollama",
                "config": {
                    "model": self.profile.embedding_model.as_str(),
                    "ollama_base_url": self.profile.llm_url.as_str(),
                },
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| MemoryError::Unavailable(format!("{url}: {e}")))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(MemoryError::Unavailable(format!(
                "store configuration at {url} returned status {status}"
            )));
        }

        info!(
            target: "ltm",
            provider = %self.profile.provider,
            collection = %self.profile.collection,
            "Memory store configured"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MemoryHit>,
}

#[async_trait]
impl MemoryStore for RestMemoryStore {
    fn name(&self) -> &str {
        "rest"
    }

    async fn add(&self, text: &str, user_id: &str) -> Result<(), MemoryError> {
        let url = format!("{}/memories", self.base_url);

        let body = serde_json::json!({
            "text": text,
            "user_id": user_id,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| MemoryError::WriteFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(MemoryError::WriteFailed(format!(
                "status {status}: {error_body}"
            )));
        }

        debug!(target: "ltm", chars = text.len(), "Memory added to store");
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        let url = format!("{}/search", self.base_url);

        let body = serde_json::json!({
            "query": query,
            "user_id": user_id,
            "limit": limit,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| MemoryError::SearchFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(MemoryError::SearchFailed(format!(
                "status {status}: {error_body}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::SearchFailed(format!("unparseable response: {e}")))?;

        Ok(parsed.results)
    }

    async fn reset(&self, user_id: &str) -> Result<(), MemoryError> {
        let url = format!("{}/memories", self.base_url);

        let body = serde_json::json!({ "user_id": user_id });

        let response = self
            .client
            .delete(&url)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| MemoryError::ResetFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(MemoryError::ResetFailed(format!("status {status}")));
        }

        info!(target: "ltm", user_id, "Memory namespace reset");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), MemoryError> {
        self.configure().await
    }
}
