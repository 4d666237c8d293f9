//! Generation endpoint clients for echomind.

pub mod ollama;

pub use ollama::OllamaClient;
