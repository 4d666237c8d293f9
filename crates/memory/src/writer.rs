//! Background memory writer — the off-critical-path half of the gateway.
//!
//! A bounded queue drained by one worker task, rather than an unmanaged
//! spawn per turn: shutdown and error visibility stay deterministic while
//! the "never block the turn" contract holds. `enqueue` never waits; write
//! failures are logged and never surfaced — the user already has their
//! answer by the time the write runs. In-flight writes are never canceled
//! mid-flight (a partial write could corrupt a store record); at process
//! exit the worker may simply be abandoned.

use crate::long_term::LongTermMemory;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Default number of pending writes the queue holds before dropping.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Handle to the background write queue.
pub struct MemoryWriter {
    tx: mpsc::Sender<String>,
    handle: JoinHandle<()>,
}

impl MemoryWriter {
    /// Spawn the drain worker on the current runtime.
    pub fn spawn(memory: Arc<LongTermMemory>, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<String>(queue_capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                match memory.add(&text).await {
                    Ok(()) => {
                        debug!(target: "ltm", chars = text.len(), "Interaction written to long-term memory");
                    }
                    Err(e) => {
                        error!(target: "ltm", error = %e, "Long-term memory write failed");
                    }
                }
            }
            debug!(target: "ltm", "Memory writer drained and stopped");
        });

        Self { tx, handle }
    }

    /// Queue a write without blocking. Returns `false` when the write was
    /// dropped (queue full or worker gone) — logged, never an error.
    pub fn enqueue(&self, text: String) -> bool {
        match self.tx.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(target: "ltm", "Write queue full; dropping interaction");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(target: "ltm", "Write queue closed; dropping interaction");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to drain what was accepted.
    /// For orderly shutdown and tests; exiting without calling this simply
    /// abandons the worker.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}
