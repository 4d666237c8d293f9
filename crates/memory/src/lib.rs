//! Memory system for echomind.
//!
//! Two tiers: [`ShortTermMemory`] is the bounded in-process buffer of recent
//! interactions; [`LongTermMemory`] is the namespace-scoped gateway to the
//! external semantic store, fed off the critical path by [`MemoryWriter`].

pub mod in_memory;
pub mod long_term;
pub mod rest;
pub mod short_term;
pub mod writer;

pub use in_memory::InMemoryStore;
pub use long_term::LongTermMemory;
pub use rest::{RestMemoryStore, StoreProfile};
pub use short_term::ShortTermMemory;
pub use writer::MemoryWriter;
