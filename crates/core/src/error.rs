//! Error types for the echomind domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all echomind operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Prompt composition errors ---
    #[error("Composition error: {0}")]
    Compose(#[from] ComposeError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the streaming generation endpoint.
///
/// `Connect` signals an unreachable endpoint at initialization — fatal.
/// The remaining variants are turn-level: recovered by surfacing a short
/// system message and returning the orchestrator to idle, never retried.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Cannot reach generation endpoint at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the external long-term memory store.
///
/// Search failures degrade the turn (sentinel context); write failures are
/// logged only — the user-visible exchange has already completed.
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Memory store unavailable: {0}")]
    Unavailable(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Namespace reset failed: {0}")]
    ResetFailed(String),
}

/// A required prompt field was absent. The composer never emits a partial
/// prompt — callers must supply explicit sentinel strings for "no data".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("Prompt composition failed: missing required field '{0}'")]
    MissingField(&'static str),
}
