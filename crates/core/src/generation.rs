//! Generator trait — the abstraction over the streaming LLM endpoint.
//!
//! A Generator sends one prompt to the model and assembles the streamed
//! response, pushing the **cumulative** text to the caller after each
//! fragment. Cumulative (not delta) semantics are a contract: consumers do
//! full-text replacement while the response grows, not incremental append.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Parameters for one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "gemma3:27b").
    pub model: String,

    /// The fully composed prompt.
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// GPU layers to offload; 99 = all available, per the endpoint convention.
    #[serde(default = "default_num_gpu")]
    pub num_gpu: i32,
}

fn default_temperature() -> f32 {
    0.8
}

fn default_num_gpu() -> i32 {
    99
}

/// Callback invoked with the cumulative assembled text after each
/// successfully parsed fragment.
pub type TokenSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// The streaming generation endpoint.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "ollama").
    fn name(&self) -> &str;

    /// Stream one completion, forwarding cumulative text to `on_token`,
    /// and return the final assembled response.
    ///
    /// No automatic retry on failure: re-dispatching against a stateful
    /// streaming endpoint risks duplicate generation.
    async fn generate(
        &self,
        request: GenerationRequest,
        on_token: TokenSink<'_>,
    ) -> std::result::Result<String, GenerationError>;

    /// Health check — can we reach the endpoint? Polled at startup;
    /// failure is fatal to initialization.
    async fn health_check(&self) -> std::result::Result<(), GenerationError>;
}
