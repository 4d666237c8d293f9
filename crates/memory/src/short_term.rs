//! Short-term memory — the bounded recent-conversation buffer.
//!
//! A fixed-capacity FIFO of rendered interaction records: newest appended at
//! the back, oldest evicted from the front. Owned exclusively by one
//! assistant session and mutated only by its turn orchestrator; readers take
//! a snapshot rather than iterating live.
//!
//! These are pure in-memory data-structure operations with no failure modes.

use std::collections::VecDeque;
use tracing::debug;

/// Rendered in place of the buffer contents when it is empty. Never an empty
/// string: the prompt composer rejects empty fields.
pub const EMPTY_SENTINEL: &str = "no recent conversation.";

/// A capacity-bounded buffer of recent interaction records.
#[derive(Debug, Clone)]
pub struct ShortTermMemory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ShortTermMemory {
    /// Create a buffer holding at most `capacity` interactions (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when at capacity. O(1) amortized.
    pub fn append(&mut self, record: impl Into<String>) {
        self.entries.push_back(record.into());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            debug!(target: "stm", capacity = self.capacity, "Evicted oldest interaction");
        }
    }

    /// Current contents in insertion order, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Render the buffer for prompt injection: newline-joined records, or
    /// the [`EMPTY_SENTINEL`] when empty.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            EMPTY_SENTINEL.to_string()
        } else {
            let mut out = String::new();
            for (i, entry) in self.entries.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(entry);
            }
            out
        }
    }

    /// Change the capacity, keeping the most recent `min(len, new_capacity)`
    /// records and discarding the oldest excess.
    pub fn resize(&mut self, new_capacity: usize) {
        self.capacity = new_capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        debug!(target: "stm", capacity = self.capacity, len = self.entries.len(), "Buffer resized");
    }

    /// Empty the buffer. Irreversible; confirmation is a caller concern.
    pub fn clear(&mut self) {
        self.entries.clear();
        debug!(target: "stm", "Buffer cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new(10)
    }
}
