//! Shared test helpers — scripted doubles for the external collaborators.
//!
//! Public so integration tests can use them; not intended for production
//! wiring.

use crate::turn::{TurnOrchestrator, TurnSettings};
use echomind_core::error::{GenerationError, MemoryError};
use echomind_core::generation::{GenerationRequest, Generator, TokenSink};
use echomind_core::input::InputSource;
use echomind_core::memory::{MemoryHit, MemoryStore};
use echomind_core::persona::Persona;
use echomind_memory::long_term::LongTermMemory;
use echomind_memory::writer::MemoryWriter;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted generation: a fragment stream or a failure.
pub enum Script {
    Stream(Vec<&'static str>),
    Fail(GenerationError),
}

/// A generator that plays back a sequence of scripted responses and records
/// every request it receives. Panics when called more times than scripted.
pub struct ScriptedGenerator {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new_sequence(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Each reply is streamed as a single fragment.
    pub fn replies(replies: &[&'static str]) -> Self {
        Self::new_sequence(replies.iter().map(|r| Script::Stream(vec![*r])).collect())
    }

    /// One call that streams the given fragments.
    pub fn streaming(fragments: Vec<&'static str>) -> Self {
        Self::new_sequence(vec![Script::Stream(fragments)])
    }

    /// One call that fails with the given error.
    pub fn failing(error: GenerationError) -> Self {
        Self::new_sequence(vec![Script::Fail(error)])
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.prompt.clone())
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        on_token: TokenSink<'_>,
    ) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedGenerator: no scripted response left");

        match script {
            Script::Stream(fragments) => {
                let mut full = String::new();
                for fragment in fragments {
                    full.push_str(fragment);
                    on_token(&full);
                }
                Ok(full)
            }
            Script::Fail(error) => Err(error),
        }
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

/// A store whose operations can be made to fail, recording every add.
pub struct FlakyStore {
    fail_search: bool,
    fail_add: bool,
    hits: Vec<MemoryHit>,
    adds: Mutex<Vec<String>>,
}

impl FlakyStore {
    pub fn healthy(hits: Vec<MemoryHit>) -> Self {
        Self {
            fail_search: false,
            fail_add: false,
            hits,
            adds: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Self::healthy(vec![])
        }
    }

    pub fn failing_add() -> Self {
        Self {
            fail_add: true,
            ..Self::healthy(vec![])
        }
    }

    pub fn adds(&self) -> Vec<String> {
        self.adds.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MemoryStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn add(&self, text: &str, _user_id: &str) -> Result<(), MemoryError> {
        if self.fail_add {
            return Err(MemoryError::WriteFailed("scripted add failure".into()));
        }
        self.adds.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn search(
        &self,
        _query: &str,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<MemoryHit>, MemoryError> {
        if self.fail_search {
            return Err(MemoryError::SearchFailed("scripted search failure".into()));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    async fn reset(&self, _user_id: &str) -> Result<(), MemoryError> {
        self.adds.lock().unwrap().clear();
        Ok(())
    }
}

/// An input source that plays back scripted lines, then signals exhaustion.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    shut_down: Arc<AtomicBool>,
}

impl ScriptedInput {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into(),
            shut_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Observe whether `shutdown` was called after the source was consumed.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shut_down.clone()
    }
}

impl InputSource for ScriptedInput {
    fn text(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    fn shutdown(&mut self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// Wire an orchestrator around a scripted generator and a default-user
/// flaky-free store, with standard test settings.
pub fn scripted_orchestrator(
    generator: Arc<ScriptedGenerator>,
    stm_capacity: usize,
) -> TurnOrchestrator {
    orchestrator_over_store(
        generator,
        Arc::new(echomind_memory::InMemoryStore::new()),
        stm_capacity,
    )
}

/// Same, but over a caller-supplied store.
pub fn orchestrator_over_store(
    generator: Arc<ScriptedGenerator>,
    store: Arc<dyn MemoryStore>,
    stm_capacity: usize,
) -> TurnOrchestrator {
    let memory = Arc::new(LongTermMemory::new(store, "default_user"));
    let writer = MemoryWriter::spawn(memory.clone(), 8);
    TurnOrchestrator::new(
        generator,
        memory,
        writer,
        Persona::default(),
        TurnSettings {
            model: "test-model".into(),
            temperature: 0.8,
            num_gpu: 99,
            recall_limit: 3,
        },
        stm_capacity,
    )
}
