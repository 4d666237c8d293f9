//! The turn orchestrator — echomind's top-level control loop.
//!
//! State machine: `Idle → Processing → {Idle, Error → Idle}`. An atomic
//! in-flight guard makes concurrent entry into `Processing` impossible; a
//! trigger that arrives mid-turn is rejected with a busy signal rather than
//! queued. Errors are never fatal to the loop — they surface as a short
//! system message and the state returns to `Idle`.
//!
//! Per turn: (a) snapshot + render the short-term buffer, (b) retrieve
//! long-term memories with the input as query, (c) build the identity
//! context, (d) compose the prompt, (e) stream the generation, (f) on a
//! non-empty response append the interaction to short-term memory
//! synchronously and enqueue the long-term write. The append happens-before
//! the enqueue; the write's success never affects the turn's outcome.

use crate::compose::PromptComposer;
use echomind_config::AppConfig;
use echomind_core::error::{ComposeError, GenerationError};
use echomind_core::generation::{GenerationRequest, Generator, TokenSink};
use echomind_core::interaction::Interaction;
use echomind_core::persona::{Persona, Scenario};
use echomind_memory::long_term::{LongTermMemory, UNAVAILABLE_SENTINEL};
use echomind_memory::short_term::ShortTermMemory;
use echomind_memory::writer::MemoryWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// How a turn trigger resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn ran to completion. The reply may be empty if the model
    /// produced nothing; nothing is recorded in that case.
    Completed { reply: String },

    /// Empty/whitespace-only input — discarded with no side effects.
    Ignored,

    /// A turn was already in flight; this trigger was rejected.
    Busy,
}

/// A failed turn. Recovered at the session level: logged, surfaced as a
/// one-line system message, state back to `Idle`. Never retried — the user
/// re-submits.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("prompt composition failed: {0}")]
    Compose(#[from] ComposeError),
}

impl TurnError {
    /// The short, non-technical line shown on the conversational surface.
    /// Raw error text never reaches the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            TurnError::Generation(GenerationError::Timeout(_)) => {
                "The model took too long to respond. Please try again."
            }
            TurnError::Generation(_) => {
                "I couldn't reach the language model. Please try again in a moment."
            }
            TurnError::Compose(_) => "I couldn't put together a prompt for that message.",
        }
    }
}

/// Attempted to set a temperature outside the valid range.
#[derive(Debug, Error)]
#[error("temperature must be between 0.0 and 1.0 (got {0})")]
pub struct InvalidTemperature(pub f32);

/// Operator-adjustable generation parameters, read once at turn start so
/// changes take effect on the next turn without a restart.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: f32,
    pub num_gpu: i32,
    pub recall_limit: usize,
}

impl TurnSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            num_gpu: config.num_gpu,
            recall_limit: config.recall_limit,
        }
    }
}

/// The turn state machine and its owned resources.
pub struct TurnOrchestrator {
    generator: RwLock<Arc<dyn Generator>>,
    memory: Arc<LongTermMemory>,
    writer: MemoryWriter,
    persona: Persona,
    scenario: Scenario,
    composer: PromptComposer,
    short_term: Mutex<ShortTermMemory>,
    settings: Mutex<TurnSettings>,
    processing: AtomicBool,
}

impl TurnOrchestrator {
    pub fn new(
        generator: Arc<dyn Generator>,
        memory: Arc<LongTermMemory>,
        writer: MemoryWriter,
        persona: Persona,
        settings: TurnSettings,
        stm_capacity: usize,
    ) -> Self {
        let composer = PromptComposer::new(persona.name.clone());
        Self {
            generator: RwLock::new(generator),
            memory,
            writer,
            persona,
            scenario: Scenario::Default,
            composer,
            short_term: Mutex::new(ShortTermMemory::new(stm_capacity)),
            settings: Mutex::new(settings),
            processing: AtomicBool::new(false),
        }
    }

    /// Address the secondary audience instead of regular users.
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    // ── Runtime-adjustable parameters ──

    pub fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        info!(target: "turn", %model, "Model updated");
        self.lock_settings().model = model;
    }

    pub fn set_temperature(&self, temperature: f32) -> Result<(), InvalidTemperature> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(InvalidTemperature(temperature));
        }
        info!(target: "turn", temperature, "Temperature updated");
        self.lock_settings().temperature = temperature;
        Ok(())
    }

    pub fn set_num_gpu(&self, num_gpu: i32) {
        self.lock_settings().num_gpu = num_gpu;
    }

    pub fn set_recall_limit(&self, limit: usize) {
        self.lock_settings().recall_limit = limit.max(1);
    }

    /// Swap the generation client (e.g., after an endpoint change).
    /// Takes effect on the next turn.
    pub fn set_generator(&self, generator: Arc<dyn Generator>) {
        let mut current = self
            .generator
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = generator;
    }

    pub fn resize_short_term(&self, capacity: usize) {
        self.lock_short_term().resize(capacity);
    }

    pub fn clear_short_term(&self) {
        self.lock_short_term().clear();
    }

    /// Read-only view of the recent-conversation buffer (display use).
    pub fn short_term_snapshot(&self) -> Vec<String> {
        self.lock_short_term().snapshot()
    }

    // ── Accessors for session wiring ──

    pub fn generator(&self) -> Arc<dyn Generator> {
        self.generator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn memory(&self) -> Arc<LongTermMemory> {
        self.memory.clone()
    }

    pub fn persona_name(&self) -> &str {
        &self.persona.name
    }

    /// Close the write queue and wait for pending long-term writes.
    /// Orderly-shutdown helper; abandoning the queue at exit is also fine.
    pub async fn shutdown(self) {
        self.writer.close().await;
    }

    // ── Turn processing ──

    /// Run one turn. At most one turn is in flight per orchestrator; a
    /// concurrent trigger resolves to [`TurnOutcome::Busy`].
    pub async fn process_turn(
        &self,
        input: &str,
        on_token: TokenSink<'_>,
    ) -> Result<TurnOutcome, TurnError> {
        let input = input.trim();
        if input.is_empty() {
            debug!(target: "turn", "Ignoring empty input");
            return Ok(TurnOutcome::Ignored);
        }

        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(target: "turn", "A turn is already in flight; rejecting input");
            return Ok(TurnOutcome::Busy);
        }

        let result = self.run_turn(input, on_token).await;
        self.processing.store(false, Ordering::SeqCst);

        match result {
            Ok(reply) => Ok(TurnOutcome::Completed { reply }),
            Err(e) => {
                error!(target: "turn", error = %e, "Turn failed");
                Err(e)
            }
        }
    }

    async fn run_turn(&self, input: &str, on_token: TokenSink<'_>) -> Result<String, TurnError> {
        // (a) Snapshot-then-render the short-term buffer.
        let stm_rendered = self.lock_short_term().render();
        debug!(target: "stm", chars = stm_rendered.len(), "Short-term context rendered");

        let settings = self.lock_settings().clone();

        // (b) Long-term retrieval. A failure degrades the turn, it does not
        // abort it: the prompt gets the unavailable sentinel instead.
        let ltm_rendered = match self.memory.search(input, settings.recall_limit).await {
            Ok(hits) => LongTermMemory::render(&hits),
            Err(e) => {
                error!(target: "ltm", error = %e, "Long-term search failed; continuing without it");
                UNAVAILABLE_SENTINEL.to_string()
            }
        };

        // (c) Identity context, fresh per request.
        let identity_context = self.persona.context(self.scenario);

        // (d) Compose. No partial prompt on failure.
        let prompt =
            self.composer
                .compose(&identity_context, &stm_rendered, &ltm_rendered, input)?;
        debug!(target: "llm", prompt_len = prompt.len(), "Prompt composed");

        // (e) Stream the generation, forwarding cumulative text.
        let generator = self.generator();
        let request = GenerationRequest {
            model: settings.model,
            prompt,
            temperature: settings.temperature,
            num_gpu: settings.num_gpu,
        };
        let reply = generator.generate(request, on_token).await?;

        // (f) Record the interaction: short-term synchronously, long-term
        // through the write queue. STM append happens-before the enqueue.
        if reply.trim().is_empty() {
            debug!(target: "turn", "Empty response; nothing recorded");
        } else {
            let record = Interaction::new(input, reply.as_str()).render();
            self.lock_short_term().append(record.clone());
            info!(target: "stm", "Interaction appended to short-term memory");
            self.writer.enqueue(record);
        }

        Ok(reply)
    }

    fn lock_short_term(&self) -> std::sync::MutexGuard<'_, ShortTermMemory> {
        self.short_term
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_settings(&self) -> std::sync::MutexGuard<'_, TurnSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
