//! # Echomind Core
//!
//! Domain types, traits, and error definitions for the echomind assistant —
//! a persona-driven conversational core with a two-tier memory (bounded
//! short-term buffer + external semantic long-term store) around a streaming
//! generation endpoint. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod generation;
pub mod input;
pub mod interaction;
pub mod memory;
pub mod persona;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use generation::{GenerationRequest, Generator};
pub use input::InputSource;
pub use interaction::Interaction;
pub use memory::{MemoryHit, MemoryStore};
pub use persona::{Persona, Scenario};
