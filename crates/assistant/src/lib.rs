//! Turn orchestration for echomind.
//!
//! The per-turn pipeline: snapshot the short-term buffer, retrieve related
//! long-term memories, build the identity context, compose one prompt,
//! stream the generation, then record the finished interaction into both
//! memory tiers — the long-term write off the critical path.

pub mod compose;
pub mod session;
pub mod test_helpers;
pub mod turn;

pub use compose::PromptComposer;
pub use session::{preflight, ConnectivityError, Session, SessionEvent};
pub use turn::{TurnError, TurnOrchestrator, TurnOutcome, TurnSettings};
