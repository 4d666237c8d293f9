pub mod chat;
pub mod doctor;
pub mod memory;
pub mod onboard;

use echomind_config::AppConfig;
use echomind_memory::rest::StoreProfile;
use echomind_memory::{InMemoryStore, LongTermMemory, RestMemoryStore};
use std::sync::Arc;

/// Build the long-term memory gateway the config describes.
pub fn build_gateway(config: &AppConfig) -> Arc<LongTermMemory> {
    let store: Arc<dyn echomind_core::memory::MemoryStore> =
        if config.memory.provider == "in_memory" {
            Arc::new(InMemoryStore::new())
        } else {
            Arc::new(RestMemoryStore::new(
                &config.memory.base_url,
                StoreProfile {
                    provider: config.memory.provider.clone(),
                    collection: config.memory.collection.clone(),
                    path: config.memory.path.clone(),
                    embedding_model: config.memory.embedding_model.clone(),
                    llm_model: config.memory.llm_model.clone(),
                    llm_url: config.memory.llm_url.clone(),
                },
                config.request_timeout(),
            ))
        };

    Arc::new(LongTermMemory::new(store, config.memory.user_id.clone()))
}
