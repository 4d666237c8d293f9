//! The interactive session — input loop, connectivity preflight, and the
//! mapping from turn outcomes to user-visible events.
//!
//! The session owns a boxed [`InputSource`] (voice or console — it only
//! sees the two-method contract) and drives the orchestrator until the
//! source is exhausted. Everything user-visible goes through the caller's
//! event sink; this crate never prints.

use crate::turn::{TurnOrchestrator, TurnOutcome};
use echomind_core::error::{GenerationError, MemoryError};
use echomind_core::input::InputSource;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Fatal initialization failure: the assistant must not enter its run loop
/// in a half-initialized state.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("generation endpoint unreachable: {0}")]
    Generation(#[from] GenerationError),

    #[error("memory store unreachable: {0}")]
    Memory(#[from] MemoryError),
}

/// What the session surfaces to its front-end.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// A complete user input was acquired.
    Heard(&'a str),

    /// Cumulative response text — replace, don't append.
    Token(&'a str),

    /// The turn finished with this final response.
    Completed(&'a str),

    /// A one-line system notice (turn failure, busy signal).
    System(&'a str),
}

/// Validate connectivity to both external collaborators. Run before the
/// session loop; any failure is fatal to initialization.
pub async fn preflight(orchestrator: &TurnOrchestrator) -> Result<(), ConnectivityError> {
    orchestrator.generator().health_check().await?;
    orchestrator.memory().health_check().await?;
    info!(target: "turn", "Connectivity checks passed");
    Ok(())
}

/// One running assistant session: an orchestrator plus an input source.
pub struct Session {
    orchestrator: Arc<TurnOrchestrator>,
    source: Box<dyn InputSource>,
}

impl Session {
    pub fn new(orchestrator: Arc<TurnOrchestrator>, source: Box<dyn InputSource>) -> Self {
        Self {
            orchestrator,
            source,
        }
    }

    pub fn orchestrator(&self) -> &Arc<TurnOrchestrator> {
        &self.orchestrator
    }

    /// Connectivity preflight for this session's collaborators.
    pub async fn preflight(&self) -> Result<(), ConnectivityError> {
        preflight(&self.orchestrator).await
    }

    /// Drive the input source until it is exhausted, then shut it down.
    ///
    /// Blocking input acquisition runs via `block_in_place`, so the session
    /// requires a multi-threaded runtime.
    pub async fn run(&mut self, mut on_event: impl FnMut(SessionEvent<'_>) + Send) {
        loop {
            let Some(line) = tokio::task::block_in_place(|| self.source.text()) else {
                break;
            };

            let input = line.trim().to_string();
            if input.is_empty() {
                continue;
            }
            on_event(SessionEvent::Heard(&input));

            let outcome = {
                let mut sink = |full: &str| on_event(SessionEvent::Token(full));
                self.orchestrator.process_turn(&input, &mut sink).await
            };

            match outcome {
                Ok(TurnOutcome::Completed { reply }) => {
                    on_event(SessionEvent::Completed(&reply));
                }
                Ok(TurnOutcome::Ignored) => {}
                Ok(TurnOutcome::Busy) => {
                    on_event(SessionEvent::System(
                        "Still working on the previous message.",
                    ));
                }
                Err(e) => {
                    on_event(SessionEvent::System(e.user_message()));
                }
            }
        }

        self.source.shutdown();
        info!(target: "stt", "Input source shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{scripted_orchestrator, ScriptedGenerator, ScriptedInput};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread")]
    async fn session_processes_until_source_is_exhausted() {
        let generator = Arc::new(ScriptedGenerator::replies(&["one", "two"]));
        let orchestrator = Arc::new(scripted_orchestrator(generator, 10));

        let source = ScriptedInput::new(vec!["first".into(), "second".into()]);
        let flag = source.shutdown_flag();
        let mut session = Session::new(orchestrator.clone(), Box::new(source));

        let mut completed: Vec<String> = Vec::new();
        session
            .run(|event| {
                if let SessionEvent::Completed(reply) = event {
                    completed.push(reply.to_string());
                }
            })
            .await;

        assert_eq!(completed, vec!["one", "two"]);
        assert_eq!(orchestrator.short_term_snapshot().len(), 2);
        assert!(flag.load(std::sync::atomic::Ordering::SeqCst), "shutdown not called");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blank_lines_are_skipped_silently() {
        let generator = Arc::new(ScriptedGenerator::replies(&["only"]));
        let orchestrator = Arc::new(scripted_orchestrator(generator.clone(), 10));

        let source = ScriptedInput::new(vec!["  ".into(), "real input".into()]);
        let mut session = Session::new(orchestrator, Box::new(source));

        let mut events = 0usize;
        session
            .run(|event| {
                if matches!(event, SessionEvent::Heard(_)) {
                    events += 1;
                }
            })
            .await;

        assert_eq!(events, 1);
        assert_eq!(generator.request_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn turn_failure_surfaces_as_a_system_message() {
        let generator = Arc::new(ScriptedGenerator::failing(
            echomind_core::error::GenerationError::Timeout("slow".into()),
        ));
        let orchestrator = Arc::new(scripted_orchestrator(generator, 10));

        let source = ScriptedInput::new(vec!["hello".into()]);
        let mut session = Session::new(orchestrator.clone(), Box::new(source));

        let mut system: Vec<String> = Vec::new();
        session
            .run(|event| {
                if let SessionEvent::System(msg) = event {
                    system.push(msg.to_string());
                }
            })
            .await;

        assert_eq!(system.len(), 1);
        assert!(!system[0].contains("slow"), "raw error text leaked");
        // The loop survived the failure and shut down cleanly.
        assert!(orchestrator.short_term_snapshot().is_empty());
    }
}
